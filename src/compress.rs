//! General-purpose codecs applied to serialized register arrays.
//!
//! Only the compressed length is of interest, so each codec compresses into
//! a throwaway buffer and reports its size. Dispatch is static through
//! `enum_dispatch`, keeping the per-checkpoint codec loop free of vtable
//! calls.

use std::io::{self, Write};

use enum_dispatch::enum_dispatch;
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;

#[enum_dispatch]
pub trait Compressor {
    /// Size in bytes of `bytes` after compression.
    fn compressed_len(&self, bytes: &[u8]) -> io::Result<usize>;
    /// Short name used in report headers.
    fn label(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deflate;

impl Compressor for Deflate {
    fn compressed_len(&self, bytes: &[u8]) -> io::Result<usize> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes)?;
        Ok(encoder.finish()?.len())
    }

    fn label(&self) -> &'static str {
        "deflate"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gzip;

impl Compressor for Gzip {
    fn compressed_len(&self, bytes: &[u8]) -> io::Result<usize> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes)?;
        Ok(encoder.finish()?.len())
    }

    fn label(&self) -> &'static str {
        "gzip"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zstd;

impl Compressor for Zstd {
    fn compressed_len(&self, bytes: &[u8]) -> io::Result<usize> {
        Ok(zstd::encode_all(bytes, 0)?.len())
    }

    fn label(&self) -> &'static str {
        "zstd"
    }
}

#[enum_dispatch(Compressor)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Deflate(Deflate),
    Gzip(Gzip),
    Zstd(Zstd),
}

impl Codec {
    pub fn all() -> Vec<Codec> {
        vec![Deflate.into(), Gzip.into(), Zstd.into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct() {
        let labels: Vec<_> = Codec::all().iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["deflate", "gzip", "zstd"]);
    }

    #[test]
    fn repetitive_input_shrinks() {
        let bytes = vec![0u8; 3072];
        for codec in Codec::all() {
            let len = codec.compressed_len(&bytes).unwrap();
            assert!(len < bytes.len(), "{} produced {} bytes", codec.label(), len);
        }
    }

    #[test]
    fn gzip_carries_more_framing_than_deflate() {
        let bytes: Vec<u8> = (0..=255).collect();
        let deflate = Deflate.compressed_len(&bytes).unwrap();
        let gzip = Gzip.compressed_len(&bytes).unwrap();
        assert!(gzip > deflate);
    }

    #[test]
    fn empty_input_is_accepted() {
        for codec in Codec::all() {
            assert!(codec.compressed_len(&[]).unwrap() > 0);
        }
    }
}
