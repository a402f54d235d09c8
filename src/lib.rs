//! # fasplit - Residue-Balanced FASTA Splitting
//!
//! `fasplit` is a Rust library and command line tool for splitting large
//! protein FASTA files into a fixed number of chunks, or into chunks of a
//! target size, while keeping the number of residues in every chunk close
//! to even.
//!
//! ## Algorithm
//!
//! The input is streamed once. Each record goes to a bucket drawn uniformly
//! at random from the buckets holding fewer residues than the current
//! average (any bucket when none is below average or nothing has been
//! written yet). The random generator is seeded with a fixed constant, so
//! the same input and split count always produce the same files.
//!
//! ## Output Layout
//!
//! For an output base `B` and `N` buckets, bucket `k` is written to
//! `B_{N}x_{k}.fasta` with `k` zero-padded to the width of `N`, and a
//! tab-separated summary is written to `B_SplitStats.txt`:
//!
//! ```text
//! Section  Proteins  Residues  FileSize_MB  FileName
//! 1        1204      401882    0.413        uniprot_2x_1.fasta
//! 2        1187      401874    0.412        uniprot_2x_2.fasta
//! ```
//!
//! ## Basic Usage
//!
//! ### Splitting a File
//!
//! ```rust,no_run
//! use fasplit::Splitter;
//!
//! # fn main() -> fasplit::Result<()> {
//! let mut splitter = Splitter::default();
//! let result = splitter.split_by_count("uniprot.fasta", "chunks", 4, "")?;
//! assert_eq!(result.split_count(), 4);
//! println!("{} records split", result.records_processed);
//! # Ok(())
//! # }
//! ```
//!
//! ### Splitting by Target Size
//!
//! ```rust,no_run
//! use fasplit::Splitter;
//!
//! # fn main() -> fasplit::Result<()> {
//! // aim for ~50 MB files; small inputs produce a single file
//! let mut splitter = Splitter::default();
//! let result = splitter.split_by_size("uniprot_trembl.fasta.gz", "", 50, "trembl")?;
//! println!("{} files", result.split_count());
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading and Writing Records
//!
//! ```rust
//! use fasplit::{FormatOptions, Reader, Writer};
//! use std::io::Cursor;
//!
//! # fn main() -> fasplit::Result<()> {
//! let input = ">P1 alpha\nMKV\nLLA\n>P2 beta\nMQ\n";
//! let reader = Reader::new(Cursor::new(input), FormatOptions::default());
//!
//! let mut writer = Writer::new(Vec::new(), FormatOptions::default());
//! for record in reader {
//!     writer.write_record(&record?)?;
//! }
//! writer.finish()?;
//! assert_eq!(writer.into_inner(), b">P1 alpha\nMKVLLA\n>P2 beta\nMQ\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, SplitError>`. Each error names the
//! stage that failed and maps to a stable [`ErrorCode`]:
//!
//! ```rust
//! use fasplit::{ErrorCode, Splitter};
//!
//! let err = Splitter::default()
//!     .split_by_count("missing.fasta", "", 2, "")
//!     .unwrap_err();
//! assert_eq!(err.code(), ErrorCode::InvalidInputFilePath);
//! ```

mod bucket;
mod config;
mod constructs;
mod error;
mod files;
mod io;
mod plan;
mod select;
mod splitter;
mod stats;

pub use bucket::{bucket_path, BucketSummary, OutputBucket};
pub use config::{SplitOptions, DEFAULT_SPLIT_COUNT, OPTIONS_SECTION};
pub use constructs::{
    FormatOptions, Record, DEFAULT_NAME_SEPARATOR, DEFAULT_RESIDUES_PER_LINE, DEFAULT_START_MARKER,
};
pub use error::{ErrorCode, IntoSplitError, Result, SplitError};
pub use files::{has_wildcards, output_dir_for, resolve_inputs, wildcard_match, InputFile};
pub use io::{BoxedReader, Reader, Writer};
pub use plan::{
    resolve_target_size, split_count_for_size, SizeDerivation, SplitPlan, BYTES_PER_MB,
    DEFAULT_TARGET_SIZE_MB, MIN_TARGET_SIZE_MB,
};
pub use select::{BucketSelector, SELECTOR_SEED};
pub use splitter::{
    output_base, LogObserver, RunResult, SplitObserver, SplitState, Splitter, DEFAULT_STATS_DELAY,
};
pub use stats::{stats_path, write_stats, write_table, STATS_HEADER, UNKNOWN_SIZE};
