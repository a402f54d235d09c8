mod reader;
mod writer;

pub use reader::{BoxedReader, Reader};
pub use writer::Writer;
