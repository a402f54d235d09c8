//! Writer implementations for FASTA records.
//!
//! This module formats records with a fixed sequence line width onto any
//! `Write` sink and keeps running totals of what was written.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{FormatOptions, Record};

const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Formatting writer for FASTA records.
///
/// Each record is written as a header line
/// `{start_marker}{name}{separator}{description}` followed by the sequence
/// wrapped at the configured number of residues per line. The last line of
/// a sequence may be shorter and is never padded. Records with an empty
/// sequence produce the header line only.
///
/// # Examples
///
/// ```rust
/// use fasplit::{FormatOptions, Record, Writer};
///
/// # fn main() -> fasplit::Result<()> {
/// let format = FormatOptions::default().with_residues_per_line(4)?;
/// let mut writer = Writer::new(Vec::new(), format);
/// writer.write_record(&Record::new("P1", "kinase", "MKVLAAG"))?;
/// writer.finish()?;
///
/// assert_eq!(writer.records_written(), 1);
/// assert_eq!(writer.residues_written(), 7);
/// assert_eq!(writer.into_inner(), b">P1 kinase\nMKVL\nAAG\n");
/// # Ok(())
/// # }
/// ```
pub struct Writer<W: Write> {
    /// Inner writer providing the data sink
    inner: W,

    format: FormatOptions,

    /// Number of records written so far
    records_written: u64,

    /// Number of residues written so far
    residues_written: u64,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W, format: FormatOptions) -> Self {
        Self {
            inner,
            format,
            records_written: 0,
            residues_written: 0,
        }
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn residues_written(&self) -> u64 {
        self.residues_written
    }

    pub fn format(&self) -> FormatOptions {
        self.format
    }

    /// Writes a single record.
    ///
    /// The counters only advance once the full record has been handed to
    /// the sink.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the sink rejects the write.
    pub fn write_record(&mut self, record: &Record) -> std::io::Result<()> {
        self.write_parts(&record.name, &record.description, &record.sequence)
    }

    /// Writes a record given as borrowed parts.
    ///
    /// Bytes are written as given; sequence lines hold exactly
    /// `residues_per_line` bytes except for the last.
    pub fn write_parts(
        &mut self,
        name: &[u8],
        description: &[u8],
        sequence: &[u8],
    ) -> std::io::Result<()> {
        self.inner.write_all(&[self.format.start_marker()])?;
        self.inner.write_all(name)?;
        self.inner.write_all(&[self.format.name_separator()])?;
        self.inner.write_all(description)?;
        self.inner.write_all(b"\n")?;

        for line in sequence.chunks(self.format.residues_per_line()) {
            self.inner.write_all(line)?;
            self.inner.write_all(b"\n")?;
        }

        self.records_written += 1;
        self.residues_written += sequence.len() as u64;
        Ok(())
    }

    /// Flushes all buffered data to the sink.
    pub fn finish(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    /// Consumes the writer and returns the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl Writer<BufWriter<File>> {
    /// Creates (or truncates) the file at `path` and wraps it in a buffered
    /// record writer.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use fasplit::{FormatOptions, Record, Writer};
    ///
    /// # fn main() -> std::io::Result<()> {
    /// let mut writer = Writer::from_path("subset.fasta", FormatOptions::default())?;
    /// writer.write_record(&Record::new("P1", "", "MKV"))?;
    /// writer.finish()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P, format: FormatOptions) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(
            BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file),
            format,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(format: FormatOptions, records: &[Record]) -> String {
        let mut writer = Writer::new(Vec::new(), format);
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer.finish().unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_wraps_at_default_width() {
        let sequence = "A".repeat(130);
        let out = written(FormatOptions::default(), &[Record::new("P1", "d", sequence)]);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], ">P1 d");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);
        assert_eq!(lines.len(), 4);
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_exact_multiple_of_width() {
        let format = FormatOptions::default().with_residues_per_line(3).unwrap();
        let out = written(format, &[Record::new("P1", "", "MKVLLA")]);
        assert_eq!(out, ">P1 \nMKV\nLLA\n");
    }

    #[test]
    fn test_empty_sequence_writes_header_only() {
        let out = written(FormatOptions::default(), &[Record::new("P1", "nothing", "")]);
        assert_eq!(out, ">P1 nothing\n");
    }

    #[test]
    fn test_custom_markers() {
        let format = FormatOptions::new(b'@', b'|', 2).unwrap();
        let out = written(format, &[Record::new("P1", "x", "MKV")]);
        assert_eq!(out, "@P1|x\nMK\nV\n");
    }

    #[test]
    fn test_counters() {
        let mut writer = Writer::new(Vec::new(), FormatOptions::default());
        assert_eq!(writer.records_written(), 0);

        writer.write_record(&Record::new("A", "", "MKV")).unwrap();
        writer.write_parts(b"B", b"", b"MKVLL").unwrap();

        assert_eq!(writer.records_written(), 2);
        assert_eq!(writer.residues_written(), 8);
    }

    #[test]
    fn test_write_failure_leaves_counters() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = Writer::new(Full, FormatOptions::default());
        assert!(writer.write_record(&Record::new("A", "", "MKV")).is_err());
        assert_eq!(writer.records_written(), 0);
        assert_eq!(writer.residues_written(), 0);
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let format = FormatOptions::default().with_residues_per_line(3).unwrap();
        let mut writer = Writer::new(Vec::new(), format);
        let record = Record::new(&b"P1"[..], &b"caf\xe9"[..], &b"MKV\xffL"[..]);
        writer.write_record(&record).unwrap();

        assert_eq!(writer.residues_written(), 5);
        assert_eq!(writer.into_inner(), b">P1 caf\xe9\nMKV\n\xffL\n");
    }

    #[test]
    fn test_failure_keeps_earlier_records() {
        /// Accepts `room` bytes, then rejects every write.
        struct Limited {
            data: Vec<u8>,
            room: usize,
        }
        impl Write for Limited {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if self.room == 0 {
                    return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
                }
                let n = buf.len().min(self.room);
                self.data.extend_from_slice(&buf[..n]);
                self.room -= n;
                Ok(n)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let sink = Limited {
            data: Vec::new(),
            room: 12,
        };
        let mut writer = Writer::new(sink, FormatOptions::default());
        writer.write_record(&Record::new("A", "x", "MKVLL")).unwrap();
        assert!(writer.write_record(&Record::new("B", "y", "QQQQ")).is_err());

        assert_eq!(writer.records_written(), 1);
        assert_eq!(writer.residues_written(), 5);
        writer.finish().unwrap();
        assert!(writer.into_inner().data.starts_with(b">A x\nMKVLL\n"));
    }
}
