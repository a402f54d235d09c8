//! Run options and the XML parameter file.
//!
//! A parameter file holds a single options section of key/value items:
//!
//! ```xml
//! <sections>
//!   <section name="FastaFileSplitterOptions">
//!     <item key="SplitCount" value="10" />
//!     <item key="TargetFastaFileSizeMB" value="100" />
//!     <item key="UseTargetFileSize" value="False" />
//!   </section>
//! </sections>
//! ```
//!
//! Values found in the file override the options they are loaded into.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};

use crate::{
    FormatOptions, RunResult, SplitError, SplitPlan, Splitter, DEFAULT_STATS_DELAY,
    DEFAULT_TARGET_SIZE_MB,
};

pub const DEFAULT_SPLIT_COUNT: usize = 10;
pub const OPTIONS_SECTION: &str = "FastaFileSplitterOptions";

/// Resolved options of a split run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitOptions {
    pub split_count: usize,
    pub target_size_mb: u32,
    /// Size the run by `target_size_mb` instead of `split_count`.
    pub use_target_size: bool,
    /// Directory for the outputs; empty means next to the input.
    pub output_dir: PathBuf,
    /// Base name for the outputs; empty means the input file name.
    pub output_name: String,
    pub format: FormatOptions,
    pub stats_delay: Duration,
}
impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            split_count: DEFAULT_SPLIT_COUNT,
            target_size_mb: DEFAULT_TARGET_SIZE_MB,
            use_target_size: false,
            output_dir: PathBuf::new(),
            output_name: String::new(),
            format: FormatOptions::default(),
            stats_delay: DEFAULT_STATS_DELAY,
        }
    }
}
impl SplitOptions {
    /// The plan these options select. Target-size mode wins when enabled.
    pub fn to_plan(&self) -> SplitPlan {
        if self.use_target_size {
            SplitPlan::BySize {
                target_size_mb: self.target_size_mb,
            }
        } else {
            SplitPlan::ByCount(self.split_count)
        }
    }

    /// A fresh splitter configured by these options.
    pub fn splitter(&self) -> Splitter {
        Splitter::new(self.format).with_stats_delay(self.stats_delay)
    }

    /// Splits `input` with a fresh splitter and writes to `output_dir`.
    pub fn run<P: AsRef<Path>>(&self, input: P, output_dir: &Path) -> crate::Result<RunResult> {
        self.splitter()
            .split(input, output_dir, self.to_plan(), &self.output_name)
    }

    /// Loads overrides from an XML parameter file.
    ///
    /// # Errors
    ///
    /// - [`SplitError::ParameterFileNotFound`] if the file does not exist
    /// - [`SplitError::InvalidParameterFile`] if it cannot be read or parsed,
    ///   or has no options section
    pub fn load_parameter_file<P: AsRef<Path>>(&mut self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SplitError::ParameterFileNotFound(path.to_path_buf()));
        }
        let xml = std::fs::read_to_string(path).map_err(|e| SplitError::InvalidParameterFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.apply_parameters(&xml)
            .map_err(|reason| SplitError::InvalidParameterFile {
                path: path.to_path_buf(),
                reason,
            })?;
        debug!("Loaded parameter file {}", path.display());
        Ok(())
    }

    /// Applies the options section of an XML document.
    fn apply_parameters(&mut self, xml: &str) -> std::result::Result<(), String> {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut in_section = false;
        let mut found = false;
        loop {
            match reader.read_event().map_err(|e| e.to_string())? {
                Event::Start(e) if e.name().as_ref() == b"section" => {
                    in_section = is_options_section(&e)?;
                    found |= in_section;
                }
                Event::Empty(e) if e.name().as_ref() == b"section" => {
                    found |= is_options_section(&e)?;
                }
                Event::End(e) if e.name().as_ref() == b"section" => {
                    in_section = false;
                }
                Event::Start(e) | Event::Empty(e) if in_section && e.name().as_ref() == b"item" => {
                    let key = attribute(&e, b"key")?;
                    let value = attribute(&e, b"value")?;
                    if let (Some(key), Some(value)) = (key, value) {
                        self.apply_item(&key, &value);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        if !found {
            return Err(format!("missing section '{}'", OPTIONS_SECTION));
        }
        Ok(())
    }

    fn apply_item(&mut self, key: &str, value: &str) {
        let value = value.trim();
        let applied = match key.to_ascii_lowercase().as_str() {
            "splitcount" => value.parse().map(|v| self.split_count = v).is_ok(),
            "targetfastafilesizemb" => value.parse().map(|v| self.target_size_mb = v).is_ok(),
            "usetargetfilesize" => parse_bool(value)
                .map(|v| self.use_target_size = v)
                .is_some(),
            _ => {
                debug!("Ignoring unknown parameter {}", key);
                true
            }
        };
        if !applied {
            warn!("Ignoring invalid value '{}' for parameter {}", value, key);
        }
    }
}

fn is_options_section(e: &BytesStart) -> std::result::Result<bool, String> {
    Ok(attribute(e, b"name")?
        .map(|name| name.eq_ignore_ascii_case(OPTIONS_SECTION))
        .unwrap_or(false))
}

fn attribute(e: &BytesStart, key: &[u8]) -> std::result::Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref().eq_ignore_ascii_case(key) {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}
