use crate::SplitError;

pub const DEFAULT_START_MARKER: u8 = b'>';
pub const DEFAULT_NAME_SEPARATOR: u8 = b' ';
pub const DEFAULT_RESIDUES_PER_LINE: usize = 60;

/// Formatting knobs shared by the reader and the writer.
///
/// The start marker opens every header line, the name separator ends the
/// record name on that line, and sequences are wrapped at
/// `residues_per_line` characters on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatOptions {
    start_marker: u8,
    name_separator: u8,
    residues_per_line: usize,
}
impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            start_marker: DEFAULT_START_MARKER,
            name_separator: DEFAULT_NAME_SEPARATOR,
            residues_per_line: DEFAULT_RESIDUES_PER_LINE,
        }
    }
}
impl FormatOptions {
    /// Builds a validated set of options.
    ///
    /// Both marker characters must be printable ASCII (space allowed for the
    /// separator) and must differ, and `residues_per_line` must be positive.
    pub fn new(
        start_marker: u8,
        name_separator: u8,
        residues_per_line: usize,
    ) -> crate::Result<Self> {
        if !start_marker.is_ascii_graphic() {
            return Err(SplitError::InvalidFormatOptions(format!(
                "start marker must be a printable ASCII character, found {:#x}",
                start_marker
            )));
        }
        if !(name_separator.is_ascii_graphic() || name_separator == b' ' || name_separator == b'\t')
        {
            return Err(SplitError::InvalidFormatOptions(format!(
                "name separator must be printable ASCII or whitespace, found {:#x}",
                name_separator
            )));
        }
        if start_marker == name_separator {
            return Err(SplitError::InvalidFormatOptions(
                "start marker and name separator must differ".to_string(),
            ));
        }
        if residues_per_line == 0 {
            return Err(SplitError::InvalidFormatOptions(
                "residues per line must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            start_marker,
            name_separator,
            residues_per_line,
        })
    }
    pub fn with_residues_per_line(self, residues_per_line: usize) -> crate::Result<Self> {
        Self::new(self.start_marker, self.name_separator, residues_per_line)
    }
    pub fn start_marker(&self) -> u8 {
        self.start_marker
    }
    pub fn name_separator(&self) -> u8 {
        self.name_separator
    }
    pub fn residues_per_line(&self) -> usize {
        self.residues_per_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let format = FormatOptions::default();
        assert_eq!(format.start_marker(), b'>');
        assert_eq!(format.name_separator(), b' ');
        assert_eq!(format.residues_per_line(), 60);
    }

    #[test]
    fn test_rejects_zero_width() {
        let result = FormatOptions::new(b'>', b' ', 0);
        assert!(matches!(result, Err(SplitError::InvalidFormatOptions(_))));
    }

    #[test]
    fn test_rejects_bad_markers() {
        assert!(FormatOptions::new(b'\n', b' ', 60).is_err());
        assert!(FormatOptions::new(b'>', b'>', 60).is_err());
        assert!(FormatOptions::new(b'>', b'\r', 60).is_err());
        assert!(FormatOptions::new(b'@', b'|', 80).is_ok());
        assert!(FormatOptions::new(b'>', b'\t', 80).is_ok());
    }

    #[test]
    fn test_with_residues_per_line() {
        let format = FormatOptions::default().with_residues_per_line(80).unwrap();
        assert_eq!(format.residues_per_line(), 80);
        assert_eq!(format.start_marker(), b'>');
        assert!(FormatOptions::default().with_residues_per_line(0).is_err());
    }
}
