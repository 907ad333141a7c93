//! Whole-file compression helpers around [`crate::encode`] / [`crate::decode`].
//!
//! The input is read fully into memory, transformed, and only then
//! written. Output goes to a temporary sibling that is renamed into place,
//! so a failed run never leaves a partial output file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{PackError, PackResult};

/// Suffix appended to compressed files.
pub const EXTENSION: &str = "huf";

/// Sizes of one completed file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReport {
    pub input_len: u64,
    pub output_len: u64,
}

impl FileReport {
    /// Output size as a percentage of input size.
    pub fn ratio(&self) -> f64 {
        if self.input_len == 0 {
            0.0
        } else {
            self.output_len as f64 / self.input_len as f64 * 100.0
        }
    }
}

/// Determine the output filename for compression.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

/// Determine the output filename for decompression.
///
/// Returns `None` when `input` does not carry the compressed suffix.
pub fn decompressed_path(input: &Path) -> Option<PathBuf> {
    match input.extension()?.to_str()? {
        EXTENSION => Some(input.with_extension("")),
        _ => None,
    }
}

/// Compress `input` into `output`.
pub fn compress_file(input: &Path, output: &Path, force: bool) -> PackResult<FileReport> {
    transform_file(input, output, force, crate::encode)
}

/// Decompress `input` into `output`.
pub fn decompress_file(input: &Path, output: &Path, force: bool) -> PackResult<FileReport> {
    transform_file(input, output, force, crate::decode)
}

fn transform_file(
    input: &Path,
    output: &Path,
    force: bool,
    op: fn(&[u8]) -> PackResult<Vec<u8>>,
) -> PackResult<FileReport> {
    if !input.is_file() {
        return Err(PackError::FileNotFound(input.to_path_buf()));
    }
    if output.exists() && !force {
        return Err(PackError::OutputExists(output.to_path_buf()));
    }

    let data = fs::read(input)?;
    let result = op(&data)?;
    write_atomic(output, &result)?;

    let report = FileReport {
        input_len: data.len() as u64,
        output_len: result.len() as u64,
    };
    debug!(
        input = %input.display(),
        output = %output.display(),
        input_len = report.input_len,
        output_len = report.output_len,
        "wrote file"
    );
    Ok(report)
}

/// Write `data` to a temporary file next to `path`, then rename it over
/// `path`. The temporary file is removed on failure.
pub fn write_atomic(path: &Path, data: &[u8]) -> PackResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(format!(".tmp{}", std::process::id()));
    let tmp = PathBuf::from(tmp_name);

    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
