//! Split plans: how many output files a run produces.

pub const DEFAULT_TARGET_SIZE_MB: u32 = 100;
pub const MIN_TARGET_SIZE_MB: u32 = 5;
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// The two ways of sizing a split run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitPlan {
    /// Produce exactly this many files (clamped to at least one).
    ByCount(usize),
    /// Derive the number of files from the input size and a per-file target.
    BySize { target_size_mb: u32 },
}

/// Outcome of deriving a split count from a target file size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeDerivation {
    pub split_count: usize,
    pub file_size_mb: f64,
    pub target_size_mb: u32,
    /// Conditions worth reporting: a raised target, or an input too small
    /// to be split.
    pub warnings: Vec<String>,
}

/// Applies the default and the lower bound to a requested target size.
pub fn resolve_target_size(target_size_mb: u32) -> u32 {
    match target_size_mb {
        0 => DEFAULT_TARGET_SIZE_MB,
        t => t.max(MIN_TARGET_SIZE_MB),
    }
}

/// Derives the number of output files for an input of `file_size_bytes`.
///
/// The ratio of input size to target size is rounded half away from zero,
/// so a 950 MB input with a 100 MB target yields 10 files.
///
/// # Examples
///
/// ```rust
/// use fasplit::split_count_for_size;
///
/// let mb = 1024 * 1024;
/// assert_eq!(split_count_for_size(950 * mb, 100).split_count, 10);
/// assert_eq!(split_count_for_size(40 * mb, 100).split_count, 1);
/// ```
pub fn split_count_for_size(file_size_bytes: u64, requested_mb: u32) -> SizeDerivation {
    let target_size_mb = resolve_target_size(requested_mb);
    let file_size_mb = file_size_bytes as f64 / BYTES_PER_MB;

    let mut warnings = Vec::new();
    if requested_mb != 0 && target_size_mb != requested_mb {
        warnings.push(format!(
            "Target size of {} MB is below the minimum; using {} MB",
            requested_mb, target_size_mb
        ));
    }

    let ratio = (file_size_mb / target_size_mb as f64).round();
    let split_count = if file_size_mb <= target_size_mb as f64 {
        warnings.push(format!(
            "Input file size ({:.2} MB) is not larger than the target size ({} MB); one file will be produced",
            file_size_mb, target_size_mb
        ));
        1
    } else if ratio <= 1.0 {
        warnings.push(format!(
            "Input file size ({:.2} MB) is close to the target size ({} MB); one file will be produced",
            file_size_mb, target_size_mb
        ));
        1
    } else {
        ratio as usize
    };

    SizeDerivation {
        split_count,
        file_size_mb,
        target_size_mb,
        warnings,
    }
}
