//! Report writers.
//!
//! Reports are semicolon-separated tables with one row per checkpoint,
//! written in schedule order. All numbers go through `Display`, so identical
//! study results always produce byte-identical reports.

use std::io::{self, Write};

use crate::compress::Compressor;
use crate::driver::StudyResults;
use crate::sketch::Encoding;

/// Mean compressed size of every (encoding, codec) pair at each checkpoint.
pub fn write_compression_report<W: Write>(out: &mut W, results: &StudyResults) -> io::Result<()> {
    writeln!(
        out,
        "p = {}; sample_size = {}",
        results.config.precision, results.config.sample_size
    )?;

    let mut columns = vec!["true distinct count".to_string()];
    for encoding in Encoding::ALL {
        for codec in &results.config.codecs {
            columns.push(format!(
                "compressed bytes {} {}",
                encoding.label(),
                codec.label()
            ));
        }
    }
    writeln!(out, "{}", columns.join("; "))?;

    for (target, checkpoint) in results.targets.iter().zip(&results.checkpoints) {
        let mut row = vec![target.to_string()];
        for encoding in Encoding::ALL {
            for codec_index in 0..results.config.codecs.len() {
                row.push(checkpoint.mean_compressed(encoding, codec_index).to_string());
            }
        }
        writeln!(out, "{}", row.join("; "))?;
    }
    Ok(())
}

/// Size, estimation error, and space-efficiency summary for one encoding.
pub fn write_efficiency_report<W: Write>(
    out: &mut W,
    results: &StudyResults,
    encoding: Encoding,
) -> io::Result<()> {
    writeln!(
        out,
        "p = {}; sample_size = {}; data structure = {}",
        results.config.precision,
        results.config.sample_size,
        encoding.label()
    )?;
    writeln!(
        out,
        "true distinct count; minimum memory size; average memory size; maximum memory size; \
         minimum serialization size; average serialization size; maximum serialization size; \
         relative estimation bias; relative estimation rmse; \
         estimated memory MVP; estimated serialization MVP"
    )?;

    for (target, checkpoint) in results.targets.iter().zip(&results.checkpoints) {
        let memory = checkpoint.memory(encoding);
        let serialized = checkpoint.serialized(encoding);
        writeln!(
            out,
            "{}; {}; {}; {}; {}; {}; {}; {}; {}; {}; {}",
            target,
            memory.min(),
            memory.mean(),
            memory.max(),
            serialized.min(),
            serialized.mean(),
            serialized.max(),
            checkpoint.relative_bias(),
            checkpoint.relative_rmse(),
            checkpoint.memory_mvp(encoding),
            checkpoint.serialized_mvp(encoding),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{run_study, StudyConfig};

    fn tiny_results() -> StudyResults {
        run_study(StudyConfig {
            precision: 4,
            sample_size: 2,
            cutover: 100,
            max_target: 50.0,
            relative_step: 1.0,
            ..StudyConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn compression_report_shape() {
        let results = tiny_results();
        let mut buffer = Vec::new();
        write_compression_report(&mut buffer, &results).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), results.targets.len() + 2);
        assert_eq!(lines[0], "p = 4; sample_size = 2");
        assert!(lines[1].starts_with("true distinct count; compressed bytes hll6 deflate"));
        let columns = 1 + 2 * results.config.codecs.len();
        for line in &lines[1..] {
            assert_eq!(line.split("; ").count(), columns);
        }
        assert!(lines[2].starts_with("1; "));
    }

    #[test]
    fn efficiency_report_shape() {
        let results = tiny_results();
        let mut buffer = Vec::new();
        write_efficiency_report(&mut buffer, &results, Encoding::Packed6).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), results.targets.len() + 2);
        assert_eq!(lines[0], "p = 4; sample_size = 2; data structure = hll6");
        for line in &lines[1..] {
            assert_eq!(line.split("; ").count(), 11);
        }
    }

    #[test]
    fn rows_follow_the_schedule_order() {
        let results = tiny_results();
        let mut buffer = Vec::new();
        write_efficiency_report(&mut buffer, &results, Encoding::Dense8).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let first_cells: Vec<&str> = text
            .lines()
            .skip(2)
            .map(|line| line.split("; ").next().unwrap())
            .collect();
        let expected: Vec<String> = results.targets.iter().map(|t| t.to_string()).collect();
        assert_eq!(first_cells, expected);
    }
}
