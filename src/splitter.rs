//! The split orchestrator.
//!
//! A [`Splitter`] reads an input FASTA file once, hands every record to the
//! bucket picked by its [`BucketSelector`], closes all buckets and writes
//! the summary table next to the outputs.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, info, trace, warn};

use crate::{
    bucket_path, split_count_for_size, stats_path, write_stats, BucketSelector, BucketSummary,
    FormatOptions, OutputBucket, Reader, SplitError, SplitPlan,
};

/// Default pause before output file sizes are read for the stats table.
pub const DEFAULT_STATS_DELAY: Duration = Duration::from_millis(100);

/// Compression suffixes removed before deriving the output base name.
const COMPRESSED_EXTENSIONS: [&str; 5] = ["gz", "bz2", "xz", "zst", "lzma"];

/// Stage of a split run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitState {
    Idle,
    Opening,
    Splitting,
    Closing,
    Reporting,
    Done,
    Failed,
}

/// Receives progress and warnings from a running split.
///
/// All methods have empty default implementations.
pub trait SplitObserver {
    /// Called after every record with the percentage of the input consumed.
    #[allow(unused_variables)]
    fn on_progress(&mut self, percent: f32, records_processed: u64) {}

    /// Called for conditions that do not stop the run.
    #[allow(unused_variables)]
    fn on_warning(&mut self, message: &str) {}

    /// Called once the run has finished, with a summary line.
    #[allow(unused_variables)]
    fn on_complete(&mut self, message: &str) {}
}

/// Observer that forwards everything to the `log` facade.
///
/// Progress is logged every ten percent.
#[derive(Debug, Default)]
pub struct LogObserver {
    last_decile: u32,
}
impl SplitObserver for LogObserver {
    fn on_progress(&mut self, percent: f32, records_processed: u64) {
        let decile = (percent / 10.0) as u32;
        if decile > self.last_decile {
            self.last_decile = decile;
            info!(
                "{:.0}% complete ({} records processed)",
                percent, records_processed
            );
        }
    }
    fn on_warning(&mut self, message: &str) {
        warn!("{}", message);
    }
    fn on_complete(&mut self, message: &str) {
        self.last_decile = 0;
        info!("{}", message);
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunResult {
    /// One entry per bucket, in creation order.
    pub buckets: Vec<BucketSummary>,
    pub records_processed: u64,
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub stats_path: PathBuf,
}
impl RunResult {
    pub fn split_count(&self) -> usize {
        self.buckets.len()
    }
    pub fn total_records(&self) -> u64 {
        self.buckets.iter().map(|b| b.record_count).sum()
    }
    pub fn total_residues(&self) -> u64 {
        self.buckets.iter().map(|b| b.residue_count).sum()
    }
}

/// Splits FASTA files into residue-balanced buckets.
///
/// Every splitter owns one seeded [`BucketSelector`]; two fresh splitters
/// given the same input and split count produce identical outputs.
///
/// # Examples
///
/// ```rust,no_run
/// use fasplit::Splitter;
///
/// # fn main() -> fasplit::Result<()> {
/// let mut splitter = Splitter::default();
/// let result = splitter.split_by_count("uniprot.fasta", "chunks", 8, "")?;
/// for bucket in &result.buckets {
///     println!("{}\t{}", bucket.path.display(), bucket.residue_count);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Splitter {
    format: FormatOptions,
    selector: BucketSelector,
    observer: Box<dyn SplitObserver>,
    stats_delay: Duration,
    state: SplitState,
}
impl Default for Splitter {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}
impl Splitter {
    pub fn new(format: FormatOptions) -> Self {
        Self {
            format,
            selector: BucketSelector::new(),
            observer: Box::new(LogObserver::default()),
            stats_delay: DEFAULT_STATS_DELAY,
            state: SplitState::Idle,
        }
    }

    pub fn with_observer<O: SplitObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_stats_delay(mut self, stats_delay: Duration) -> Self {
        self.stats_delay = stats_delay;
        self
    }

    pub fn state(&self) -> SplitState {
        self.state
    }

    pub fn format(&self) -> FormatOptions {
        self.format
    }

    /// Runs a split sized by `plan`.
    pub fn split<P, Q>(
        &mut self,
        input: P,
        output_dir: Q,
        plan: SplitPlan,
        output_name: &str,
    ) -> crate::Result<RunResult>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        match plan {
            SplitPlan::ByCount(split_count) => {
                self.split_by_count(input, output_dir, split_count, output_name)
            }
            SplitPlan::BySize { target_size_mb } => {
                self.split_by_size(input, output_dir, target_size_mb, output_name)
            }
        }
    }

    /// Splits `input` into files of roughly `target_size_mb` each.
    ///
    /// A target of zero selects the default size and small targets are
    /// raised to the minimum. Inputs not larger than the target produce a
    /// single file.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidInputPath`] if the input does not exist,
    /// and otherwise any error of [`Splitter::split_by_count`].
    pub fn split_by_size<P, Q>(
        &mut self,
        input: P,
        output_dir: Q,
        target_size_mb: u32,
        output_name: &str,
    ) -> crate::Result<RunResult>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let file_size = match std::fs::metadata(input) {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => {
                self.state = SplitState::Failed;
                return Err(SplitError::InvalidInputPath(input.to_path_buf()));
            }
        };

        let derived = split_count_for_size(file_size, target_size_mb);
        for warning in &derived.warnings {
            self.observer.on_warning(warning);
        }
        info!(
            "Input is {:.2} MB; target size {} MB gives {} file(s)",
            derived.file_size_mb, derived.target_size_mb, derived.split_count
        );
        self.split_by_count(input, output_dir, derived.split_count, output_name)
    }

    /// Splits `input` into `split_count` residue-balanced files.
    ///
    /// Outputs are written to `output_dir` (or next to the input when empty)
    /// and named after `output_name` (or the input file) following
    /// [`bucket_path`]. A zero split count is treated as one.
    ///
    /// # Errors
    ///
    /// - [`SplitError::InvalidInputPath`] if the input does not exist
    /// - [`SplitError::InvalidOutputDir`] if the output directory cannot be created
    /// - [`SplitError::CreateOutput`] if a bucket cannot be created
    /// - [`SplitError::OpenInput`] or a read error if the input cannot be read
    /// - [`SplitError::WriteRecord`] if a record cannot be written
    /// - [`SplitError::WriteStats`] if the summary table cannot be written
    ///
    /// Buckets created before a failure stay on disk and are closed before
    /// the error is returned.
    pub fn split_by_count<P, Q>(
        &mut self,
        input: P,
        output_dir: Q,
        split_count: usize,
        output_name: &str,
    ) -> crate::Result<RunResult>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let result = self.run(input.as_ref(), output_dir.as_ref(), split_count, output_name);
        if result.is_err() {
            self.state = SplitState::Failed;
        }
        result
    }

    fn run(
        &mut self,
        input: &Path,
        output_dir: &Path,
        split_count: usize,
        output_name: &str,
    ) -> crate::Result<RunResult> {
        self.state = SplitState::Opening;
        if input.as_os_str().is_empty() || !input.is_file() {
            return Err(SplitError::InvalidInputPath(input.to_path_buf()));
        }
        let base = output_base(input, output_dir, output_name);
        if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SplitError::InvalidOutputDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let split_count = split_count.max(1);
        info!(
            "Splitting {} into {} file(s) at {}",
            input.display(),
            split_count,
            base.display()
        );

        let mut buckets = Vec::with_capacity(split_count);
        for idx in 1..=split_count {
            buckets.push(OutputBucket::create(
                bucket_path(&base, split_count, idx),
                self.format,
            )?);
        }
        let mut reader = Reader::from_path(input, self.format)?;

        self.state = SplitState::Splitting;
        let mut totals = vec![0u64; split_count];
        let mut records_processed = 0u64;
        while let Some(record) = reader.next_record()? {
            let idx = self.selector.select(&totals);
            let idx = self.checked_index(idx, buckets.len());
            trace!(
                "{} -> bucket {}",
                String::from_utf8_lossy(&record.name),
                idx + 1
            );

            let bucket = &mut buckets[idx];
            bucket.append(&record)?;
            totals[idx] = bucket.residue_count();
            records_processed += 1;
            self.observer
                .on_progress(reader.progress_percent(), records_processed);
        }
        let lines_read = reader.lines_read();
        let lines_skipped = reader.lines_skipped();
        drop(reader);
        if lines_skipped > 0 {
            debug!("Skipped {} line(s) outside of records", lines_skipped);
        }

        self.state = SplitState::Closing;
        let summaries: Vec<BucketSummary> = buckets
            .iter_mut()
            .map(|bucket| {
                bucket.close();
                bucket.summary()
            })
            .collect();

        self.state = SplitState::Reporting;
        let stats_path = stats_path(&base);
        write_stats(&stats_path, &summaries, self.stats_delay)?;

        self.observer.on_progress(100.0, records_processed);
        self.observer.on_complete(&format!(
            "Done: processed {} records; read {} lines",
            records_processed, lines_read
        ));
        self.state = SplitState::Done;

        Ok(RunResult {
            buckets: summaries,
            records_processed,
            lines_read,
            lines_skipped,
            stats_path,
        })
    }

    /// Falls back to the first bucket when the selector returns an index
    /// outside of the bucket list.
    fn checked_index(&mut self, idx: usize, len: usize) -> usize {
        if idx < len {
            return idx;
        }
        let message = format!(
            "Selected bucket index {} is out of range for {} bucket(s); using bucket 1",
            idx, len
        );
        warn!("{}", message);
        self.observer.on_warning(&message);
        0
    }
}

/// Output path base (directory plus name stem) for a run.
///
/// The name comes from `output_name` when given, otherwise from the input
/// file, with its extension (and any compression suffix) removed. The
/// directory is `output_dir` when given, otherwise the directory of the
/// input.
pub fn output_base(input: &Path, output_dir: &Path, output_name: &str) -> PathBuf {
    let name = if output_name.is_empty() {
        strip_extensions(input)
    } else {
        strip_extensions(Path::new(output_name))
    };
    let dir = if output_dir.as_os_str().is_empty() {
        input.parent().unwrap_or_else(|| Path::new("")).to_path_buf()
    } else {
        output_dir.to_path_buf()
    };
    dir.join(name)
}

fn strip_extensions(path: &Path) -> String {
    let is_compressed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| COMPRESSED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    let path = if is_compressed {
        path.file_stem().map(Path::new).unwrap_or(path)
    } else {
        path
    };
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
