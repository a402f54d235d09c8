//! Output buckets.
//!
//! A bucket owns one output FASTA file for the duration of a run together
//! with the number of records and residues committed to it.

use std::{
    ffi::OsString,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{FormatOptions, Record, SplitError, Writer};

/// Final counters of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BucketSummary {
    pub path: PathBuf,
    pub record_count: u64,
    pub residue_count: u64,
}

/// One output file of a split run.
///
/// Counters only grow while the bucket is open. Once closed the file handle
/// is released and the counters are frozen.
///
/// # Examples
///
/// ```rust,no_run
/// use fasplit::{FormatOptions, OutputBucket, Record};
///
/// # fn main() -> fasplit::Result<()> {
/// let mut bucket = OutputBucket::create("db_2x_1.fasta", FormatOptions::default())?;
/// bucket.append(&Record::new("P1", "kinase", "MKVLAAG"))?;
/// bucket.close();
///
/// assert!(!bucket.is_open());
/// assert_eq!(bucket.record_count(), 1);
/// assert_eq!(bucket.residue_count(), 7);
/// # Ok(())
/// # }
/// ```
pub struct OutputBucket {
    path: PathBuf,
    writer: Option<Writer<BufWriter<File>>>,
    record_count: u64,
    residue_count: u64,
}
impl OutputBucket {
    /// Creates the output file, truncating any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::CreateOutput`] if the file cannot be created.
    pub fn create<P: Into<PathBuf>>(path: P, format: FormatOptions) -> crate::Result<Self> {
        let path = path.into();
        let writer = Writer::from_path(&path, format).map_err(|source| SplitError::CreateOutput {
            path: path.clone(),
            source,
        })?;
        debug!("Created output file {}", path.display());
        Ok(Self {
            path,
            writer: Some(writer),
            record_count: 0,
            residue_count: 0,
        })
    }

    /// Appends one record given as its parts.
    ///
    /// Appending to a closed bucket is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::WriteRecord`] if the write fails.
    pub fn append_record(
        &mut self,
        name: &[u8],
        description: &[u8],
        sequence: &[u8],
    ) -> crate::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        writer
            .write_parts(name, description, sequence)
            .map_err(|source| SplitError::WriteRecord {
                path: self.path.clone(),
                source,
            })?;
        self.record_count += 1;
        self.residue_count += sequence.len() as u64;
        Ok(())
    }

    pub fn append(&mut self, record: &Record) -> crate::Result<()> {
        self.append_record(&record.name, &record.description, &record.sequence)
    }

    /// Flushes and releases the file handle.
    ///
    /// Closing twice is a no-op. Flush failures are logged and otherwise
    /// ignored.
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.finish() {
                warn!("Error closing output file {}: {}", self.path.display(), e);
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn residue_count(&self) -> u64 {
        self.residue_count
    }

    pub fn summary(&self) -> BucketSummary {
        BucketSummary {
            path: self.path.clone(),
            record_count: self.record_count,
            residue_count: self.residue_count,
        }
    }
}

/// Releases the handle on every exit path, including failed runs.
impl Drop for OutputBucket {
    fn drop(&mut self) {
        self.close();
    }
}

/// Path of bucket `index` (1-based) out of `total`.
///
/// The index is zero-padded to the number of digits in `total`:
/// `bucket_path("out/db", 25, 3)` is `out/db_25x_03.fasta`.
pub fn bucket_path<P: AsRef<Path>>(base: P, total: usize, index: usize) -> PathBuf {
    let width = total.to_string().len();
    let mut name = OsString::from(base.as_ref().as_os_str());
    name.push(format!("_{}x_{:0width$}.fasta", total, index, width = width));
    PathBuf::from(name)
}
