use cardinality_lab::driver::{run_study, StudyConfig, StudyResults};
use cardinality_lab::report::{write_compression_report, write_efficiency_report};
use cardinality_lab::sketch::Encoding;

fn study_config() -> StudyConfig {
    StudyConfig {
        precision: 8,
        sample_size: 48,
        cutover: 500,
        max_target: 1e5,
        relative_step: 0.5,
        ..StudyConfig::default()
    }
}

fn render(results: &StudyResults) -> Vec<u8> {
    let mut buffer = Vec::new();
    write_compression_report(&mut buffer, results).unwrap();
    for encoding in Encoding::ALL {
        write_efficiency_report(&mut buffer, results, encoding).unwrap();
    }
    buffer
}

#[test]
fn repeated_runs_render_identical_reports() {
    let first = run_study(study_config()).unwrap();
    let second = run_study(study_config()).unwrap();
    assert_eq!(render(&first), render(&second));
}

#[test]
fn reports_do_not_depend_on_the_thread_count() {
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| run_study(study_config()))
        .unwrap();
    let several = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| run_study(study_config()))
        .unwrap();
    assert_eq!(render(&single), render(&several));
}

#[test]
fn compressed_sizes_grow_with_the_true_count() {
    let results = run_study(study_config()).unwrap();
    let first = results.checkpoints.first().unwrap();
    let last = results.checkpoints.last().unwrap();

    assert!(
        first.mean_compressed(Encoding::Packed6, 0) < last.mean_compressed(Encoding::Packed6, 0)
    );

    // A full register array is close to incompressible; allow for framing.
    let raw = (1u64 << 8) as f64 * 6.0 / 8.0;
    for codec in 0..results.config.codecs.len() {
        assert!(last.mean_compressed(Encoding::Packed6, codec) < raw + 64.0);
    }
}

#[test]
fn error_metrics_stay_within_the_expected_band() {
    let results = run_study(study_config()).unwrap();
    for checkpoint in &results.checkpoints {
        assert!(
            checkpoint.relative_bias().abs() < 0.1,
            "bias {} at n = {}",
            checkpoint.relative_bias(),
            checkpoint.true_count()
        );
        assert!(
            checkpoint.relative_rmse() < 0.25,
            "rmse {} at n = {}",
            checkpoint.relative_rmse(),
            checkpoint.true_count()
        );
    }
}

#[test]
fn extreme_targets_saturate_but_stay_finite() {
    let results = run_study(StudyConfig {
        precision: 4,
        sample_size: 8,
        cutover: 100,
        max_target: 1e21,
        relative_step: 8.0,
        codecs: Vec::new(),
        ..StudyConfig::default()
    })
    .unwrap();

    assert_eq!(
        results.targets.last().unwrap().to_string(),
        "1000000000000000000000"
    );
    let last = results.checkpoints.last().unwrap();
    assert!(last.relative_bias() > -1.0);
    assert!(last.relative_rmse().is_finite());
    for checkpoint in &results.checkpoints {
        assert!(checkpoint.memory_mvp(Encoding::Packed6).is_finite());
    }
}
