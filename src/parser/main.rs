use crate::error::DecodeResult;
use crate::parser::header::{decode_header_slice, read_header};
use crate::parser::samples::decode_samples;
use crate::types::{RawHeader, SampleDecode, HEADER_SIZE};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Header and samples of one decoded channel file
#[derive(Debug, Clone)]
pub struct FileDecode {
    pub path: PathBuf,
    pub header: RawHeader,
    pub decode: SampleDecode,
}

/// Per-file figures kept after the samples move into the group merge
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileSummary {
    pub path: PathBuf,
    pub header: RawHeader,
    pub samples: usize,
    pub nan_count: u64,
    pub missing: u64,
}

impl FileDecode {
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            path: self.path.clone(),
            header: self.header.clone(),
            samples: self.decode.samples.len(),
            nan_count: self.decode.nan_count,
            missing: self.decode.missing,
        }
    }
}

/// Decode one channel file from disk
pub fn decode_file(file_path: &Path) -> DecodeResult<FileDecode> {
    let file = File::open(file_path)?;
    let mut reader = BufReader::new(file);

    let header = read_header(&mut reader)?;
    let decode = decode_samples(&mut reader, &header)?;

    log::debug!(
        "{}: '{}' [{}] {} samples, {} NaN, {} missing",
        file_path.display(),
        header.label(),
        header.eng_units,
        decode.samples.len(),
        decode.nan_count,
        decode.missing
    );

    Ok(FileDecode {
        path: file_path.to_path_buf(),
        header,
        decode,
    })
}

/// Decode a channel file already held in memory
pub fn decode_bytes(data: &[u8]) -> DecodeResult<(RawHeader, SampleDecode)> {
    let header = decode_header_slice(data)?;
    let decode = decode_samples(&data[HEADER_SIZE..], &header)?;
    Ok((header, decode))
}
