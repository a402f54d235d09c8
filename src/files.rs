//! Input file resolution: wildcards, recursive search and output directories.

use std::path::{Path, PathBuf};

use log::debug;

use crate::SplitError;

/// An input file found while resolving an input pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputFile {
    pub path: PathBuf,
    /// Directory of the file relative to the directory the search started in.
    pub relative_dir: PathBuf,
}

/// Returns true if `name` matches `pattern`, where `*` matches any run of
/// characters and `?` matches exactly one. Matching ignores ASCII case.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let name: Vec<char> = name.to_lowercase().chars().collect();

    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while n < name.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == name[n]) {
            p += 1;
            n += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, n));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            n = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

pub fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Expands an input argument into the files it names.
///
/// The file name component may contain wildcards. With `recurse`, matching
/// files in subdirectories are included too, searching at most `max_depth`
/// directory levels including the starting one (0 searches without limit).
/// Results are sorted by path within each directory, and files of a
/// directory come before those of its subdirectories.
///
/// # Errors
///
/// Returns [`SplitError::InvalidInputPath`] if nothing matches, and
/// [`SplitError::SearchPath`] if a directory cannot be listed.
pub fn resolve_inputs<P: AsRef<Path>>(
    input: P,
    recurse: bool,
    max_depth: usize,
) -> crate::Result<Vec<InputFile>> {
    let input = input.as_ref();
    let pattern = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if pattern.is_empty() {
        return Err(SplitError::InvalidInputPath(input.to_path_buf()));
    }

    if !recurse && !has_wildcards(&pattern) {
        if input.is_file() {
            return Ok(vec![InputFile {
                path: input.to_path_buf(),
                relative_dir: PathBuf::new(),
            }]);
        }
        return Err(SplitError::InvalidInputPath(input.to_path_buf()));
    }

    let root = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !root.is_dir() {
        return Err(SplitError::InvalidInputPath(input.to_path_buf()));
    }

    let mut found = Vec::new();
    let depth_limit = if recurse { max_depth } else { 1 };
    collect_matches(&root, Path::new(""), &pattern, 1, depth_limit, &mut found)?;
    if found.is_empty() {
        return Err(SplitError::InvalidInputPath(input.to_path_buf()));
    }
    debug!("{} matched {} file(s)", input.display(), found.len());
    Ok(found)
}

fn collect_matches(
    dir: &Path,
    relative_dir: &Path,
    pattern: &str,
    depth: usize,
    depth_limit: usize,
    found: &mut Vec<InputFile>,
) -> crate::Result<()> {
    let search_err = |source: std::io::Error| SplitError::SearchPath {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(search_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(search_err)?;
    entries.sort();

    let mut subdirs = Vec::new();
    for path in entries {
        if path.is_dir() {
            subdirs.push(path);
        } else if path
            .file_name()
            .map(|n| wildcard_match(pattern, &n.to_string_lossy()))
            .unwrap_or(false)
        {
            found.push(InputFile {
                path,
                relative_dir: relative_dir.to_path_buf(),
            });
        }
    }

    if depth_limit != 0 && depth >= depth_limit {
        return Ok(());
    }
    for subdir in subdirs {
        let Some(name) = subdir.file_name() else {
            continue;
        };
        let relative = relative_dir.join(name);
        collect_matches(&subdir, &relative, pattern, depth + 1, depth_limit, found)?;
    }
    Ok(())
}

/// Output directory for one resolved input.
///
/// Without an alternative directory the outputs go to `output_dir` (empty
/// meaning next to the input). With one, they go beneath it, re-creating the
/// input's relative directory when `mirror` is set.
pub fn output_dir_for(
    input: &InputFile,
    output_dir: &Path,
    alt_output_dir: Option<&Path>,
    mirror: bool,
) -> PathBuf {
    match alt_output_dir {
        Some(alt) if mirror => alt.join(&input.relative_dir),
        Some(alt) => alt.to_path_buf(),
        None => output_dir.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, ">A\nM\n").unwrap();
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.fasta"));
        touch(&dir.path().join("b.fasta"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("sub").join("c.fasta"));
        touch(&dir.path().join("sub").join("deeper").join("d.fasta"));
        dir
    }

    fn names(found: &[InputFile]) -> Vec<String> {
        found
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*.fasta", "db.fasta"));
        assert!(wildcard_match("*.FASTA", "db.fasta"));
        assert!(wildcard_match("db?.fa*", "db1.fasta"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("a*b*c", "aXXbYYc"));
        assert!(!wildcard_match("*.fasta", "db.fasta.gz"));
        assert!(!wildcard_match("db?.fasta", "db.fasta"));
        assert!(!wildcard_match("a*b*c", "aXXbYY"));
    }

    #[test]
    fn test_single_file() {
        let dir = tree();
        let found = resolve_inputs(dir.path().join("a.fasta"), false, 0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].relative_dir, PathBuf::new());
    }

    #[test]
    fn test_missing_file() {
        let dir = tree();
        let result = resolve_inputs(dir.path().join("zzz.fasta"), false, 0);
        assert!(matches!(result, Err(SplitError::InvalidInputPath(_))));

        let result = resolve_inputs(dir.path().join("*.xml"), false, 0);
        assert!(matches!(result, Err(SplitError::InvalidInputPath(_))));
    }

    #[test]
    fn test_wildcard_no_recurse() {
        let dir = tree();
        let found = resolve_inputs(dir.path().join("*.fasta"), false, 0).unwrap();
        assert_eq!(names(&found), vec!["a.fasta", "b.fasta"]);
    }

    #[test]
    fn test_recurse_unlimited() {
        let dir = tree();
        let found = resolve_inputs(dir.path().join("*.fasta"), true, 0).unwrap();
        assert_eq!(
            names(&found),
            vec!["a.fasta", "b.fasta", "c.fasta", "d.fasta"]
        );
        assert_eq!(found[3].relative_dir, Path::new("sub").join("deeper"));
    }

    #[test]
    fn test_recurse_depth_limit() {
        let dir = tree();
        let found = resolve_inputs(dir.path().join("*.fasta"), true, 2).unwrap();
        assert_eq!(names(&found), vec!["a.fasta", "b.fasta", "c.fasta"]);

        let found = resolve_inputs(dir.path().join("*.fasta"), true, 1).unwrap();
        assert_eq!(names(&found), vec!["a.fasta", "b.fasta"]);
    }

    #[test]
    fn test_output_dir_for() {
        let input = InputFile {
            path: PathBuf::from("in/sub/c.fasta"),
            relative_dir: PathBuf::from("sub"),
        };
        let out = Path::new("out");
        let alt = Path::new("alt");

        assert_eq!(output_dir_for(&input, out, None, true), PathBuf::from("out"));
        assert_eq!(output_dir_for(&input, out, Some(alt), false), PathBuf::from("alt"));
        assert_eq!(
            output_dir_for(&input, out, Some(alt), true),
            Path::new("alt").join("sub")
        );
    }

    #[test]
    fn test_unlistable_directory() {
        let dir = tree();
        let result = collect_matches(
            &dir.path().join("a.fasta"),
            Path::new(""),
            "*.fasta",
            1,
            0,
            &mut Vec::new(),
        );
        match result {
            Err(err @ SplitError::SearchPath { .. }) => {
                assert_eq!(err.code(), crate::ErrorCode::FilePathError);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
