mod format;
mod record;

pub use format::{
    FormatOptions, DEFAULT_NAME_SEPARATOR, DEFAULT_RESIDUES_PER_LINE, DEFAULT_START_MARKER,
};
pub use record::Record;
