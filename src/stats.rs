//! Tab-separated summary of a finished split.

use std::{
    ffi::OsString,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use crate::{BucketSummary, SplitError, BYTES_PER_MB};

pub const STATS_HEADER: [&str; 5] = ["Section", "Proteins", "Residues", "FileSize_MB", "FileName"];

/// Written in place of a file size that could not be read.
pub const UNKNOWN_SIZE: &str = "NA";

/// Path of the stats file for an output base path.
pub fn stats_path<P: AsRef<Path>>(base: P) -> PathBuf {
    let mut name = OsString::from(base.as_ref().as_os_str());
    name.push("_SplitStats.txt");
    PathBuf::from(name)
}

/// Writes the summary table to `path`.
///
/// Waits `delay` before reading file sizes, since metadata can lag behind a
/// freshly closed file on some filesystems.
///
/// # Errors
///
/// Returns [`SplitError::WriteStats`] if the table cannot be written.
pub fn write_stats<P: AsRef<Path>>(
    path: P,
    buckets: &[BucketSummary],
    delay: Duration,
) -> crate::Result<()> {
    let path = path.as_ref();
    if !delay.is_zero() {
        thread::sleep(delay);
    }
    let stats_err = |source: std::io::Error| SplitError::WriteStats {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = File::create(path).map(BufWriter::new).map_err(stats_err)?;
    write_table(&mut wtr, buckets).map_err(stats_err)?;
    wtr.flush().map_err(stats_err)
}

/// Writes the header row and one row per bucket.
pub fn write_table<W: Write>(wtr: &mut W, buckets: &[BucketSummary]) -> std::io::Result<()> {
    writeln!(wtr, "{}", STATS_HEADER.join("\t"))?;
    for (idx, bucket) in buckets.iter().enumerate() {
        let size = match std::fs::metadata(&bucket.path) {
            Ok(meta) => format!("{:.3}", meta.len() as f64 / BYTES_PER_MB),
            Err(_) => UNKNOWN_SIZE.to_string(),
        };
        let name = bucket
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(
            wtr,
            "{}\t{}\t{}\t{}\t{}",
            idx + 1,
            bucket.record_count,
            bucket.residue_count,
            size,
            name
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stats_path() {
        assert_eq!(
            stats_path(Path::new("out").join("db")),
            Path::new("out").join("db_SplitStats.txt")
        );
    }

    #[test]
    fn test_table_rows() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("db_2x_1.fasta");
        std::fs::write(&first, vec![b'A'; 1024 * 1024]).unwrap();

        let buckets = vec![
            BucketSummary {
                path: first,
                record_count: 3,
                residue_count: 120,
            },
            BucketSummary {
                path: dir.path().join("db_2x_2.fasta"),
                record_count: 0,
                residue_count: 0,
            },
        ];

        let mut out = Vec::new();
        write_table(&mut out, &buckets).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Section\tProteins\tResidues\tFileSize_MB\tFileName");
        assert_eq!(lines[1], "1\t3\t120\t1.000\tdb_2x_1.fasta");
        assert_eq!(lines[2], "2\t0\t0\tNA\tdb_2x_2.fasta");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_stats_file() {
        let dir = TempDir::new().unwrap();
        let path = stats_path(dir.path().join("db"));

        write_stats(&path, &[], Duration::ZERO).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Section\tProteins\tResidues\tFileSize_MB\tFileName\n");
    }

    #[test]
    fn test_write_stats_bad_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("db_SplitStats.txt");

        let result = write_stats(&path, &[], Duration::ZERO);
        assert!(matches!(result, Err(SplitError::WriteStats { .. })));
    }
}
