//! The conversion pass: read the whole RAW payload, check its size against
//! the header, then write header + payload to the output file.
//!
//! The output file is not opened until every check has passed, so a failed
//! run never creates or truncates it.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::args::ConvertJob;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Error: unable to read file '{}'", .path.display())]
    Read { path: PathBuf, #[source] source: io::Error },
    #[error("Error: unable to read file '{}'", .path.display())]
    ShortRead { path: PathBuf, expected: u64, actual: u64 },
    #[error("Error: unexpected input file size {actual} (expected: {expected} bytes).")]
    SizeMismatch { actual: u64, expected: u64 },
    #[error("Error: unable to write result file '{}'", .path.display())]
    Write { path: PathBuf, #[source] source: io::Error },
}

/// Summary line printed once the input has been loaded.
pub fn summary(job: &ConvertJob) -> String {
    format!(
        "Output: '{}' {}x{}x{}@{}.",
        job.output.display(),
        job.header.size_x,
        job.header.size_y,
        job.header.size_z,
        job.format.name(),
    )
}

/// Run the conversion, printing the summary line to `out`.
/// Returns the number of payload bytes copied.
pub fn convert<O: Write>(job: &ConvertJob, out: &mut O) -> Result<u64, ConvertError> {
    let payload = read_payload(&job.input)?;
    let actual = payload.len() as u64;

    let _ = writeln!(out, "{}", summary(job));

    let expected = job.format.bytes_per_sample() * job.header.voxel_count();
    if actual != expected {
        return Err(ConvertError::SizeMismatch { actual, expected });
    }

    write_rek(job, &payload).map_err(|source| ConvertError::Write {
        path: job.output.clone(),
        source,
    })?;
    debug!(output = %job.output.display(), bytes = actual, "wrote REK file");
    Ok(actual)
}

fn read_payload(path: &Path) -> Result<Vec<u8>, ConvertError> {
    let read_err = |source| ConvertError::Read { path: path.to_owned(), source };

    let file = File::open(path).map_err(read_err)?;
    let expected = file.metadata().map_err(read_err)?.len();
    let mut payload = Vec::with_capacity(expected as usize);
    file.take(expected).read_to_end(&mut payload).map_err(read_err)?;

    let actual = payload.len() as u64;
    if actual != expected {
        return Err(ConvertError::ShortRead { path: path.to_owned(), expected, actual });
    }
    debug!(input = %path.display(), bytes = actual, "loaded payload");
    Ok(payload)
}

fn write_rek(job: &ConvertJob, payload: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(&job.output)?);
    job.header.write(&mut writer)?;
    writer.write_all(payload)?;
    writer.flush()
}
