//! Streaming FASTA reader.
//!
//! This module provides the record reader that feeds a split run. Records
//! are parsed one at a time so that memory use stays flat regardless of the
//! input size, and the reader keeps the line and byte accounting the
//! splitter reports.

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{FormatOptions, Record, SplitError};

const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Shortest input worth handing to the compression sniffer. A gzip member
/// is never smaller than this.
#[cfg(feature = "niffler")]
const MIN_SNIFF_SIZE: u64 = 18;

pub type BoxedReader = BufReader<Box<dyn Read + Send>>;

/// Counts raw bytes pulled from the file, before any decompression.
struct CountingReader<R: Read> {
    inner: R,
    count: Arc<AtomicU64>,
}
impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Header and sequence of the record currently being assembled.
struct Pending {
    name: Vec<u8>,
    description: Vec<u8>,
    sequence: Vec<u8>,
}
impl Pending {
    fn into_record(self) -> Record {
        Record {
            name: self.name,
            description: self.description,
            sequence: self.sequence,
        }
    }
}

/// Streaming reader for FASTA files.
///
/// A record starts on a line beginning with the start marker. The name runs
/// up to the first name separator and the rest of the line is the
/// description. Every following line up to the next header is sequence,
/// concatenated with line breaks and whitespace removed. All other bytes
/// are kept as they are, whatever their encoding.
///
/// Non-blank lines that cannot belong to a record (text before the first
/// header, or a header without a name and the lines following it) are
/// counted as skipped and never abort parsing.
///
/// # Examples
///
/// ```rust
/// use fasplit::{FormatOptions, Reader};
/// use std::io::Cursor;
///
/// # fn main() -> fasplit::Result<()> {
/// let data = ">P1 first protein\nMKV\nLLA\n>P2\nMQ\n";
/// let mut reader = Reader::new(Cursor::new(data), FormatOptions::default());
///
/// let first = reader.next_record()?.unwrap();
/// assert_eq!(first.name, b"P1");
/// assert_eq!(first.description, b"first protein");
/// assert_eq!(first.sequence, b"MKVLLA");
///
/// let second = reader.next_record()?.unwrap();
/// assert_eq!(second.sequence, b"MQ");
/// assert!(reader.next_record()?.is_none());
/// assert_eq!(reader.lines_read(), 5);
/// # Ok(())
/// # }
/// ```
pub struct Reader<R: BufRead> {
    /// Inner reader providing the text stream
    inner: R,

    format: FormatOptions,

    /// Reused line buffer
    line: Vec<u8>,

    /// Record whose header has been seen but whose sequence may continue
    pending: Option<Pending>,

    lines_read: u64,
    lines_skipped: u64,

    /// Bytes consumed from the (decompressed) text stream
    bytes_read: u64,

    /// Raw file position, shared with the counting wrapper when reading a file
    position: Option<Arc<AtomicU64>>,

    /// Size of the source in bytes, when known
    total_bytes: Option<u64>,

    eof: bool,
}
impl<R: BufRead> Reader<R> {
    pub fn new(inner: R, format: FormatOptions) -> Self {
        Self {
            inner,
            format,
            line: Vec::with_capacity(256),
            pending: None,
            lines_read: 0,
            lines_skipped: 0,
            bytes_read: 0,
            position: None,
            total_bytes: None,
            eof: false,
        }
    }

    /// Sets the source size used for progress reporting.
    pub fn with_total_bytes(mut self, total_bytes: u64) -> Self {
        self.total_bytes = Some(total_bytes);
        self
    }

    /// Reads the next record, or `None` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails.
    pub fn next_record(&mut self) -> crate::Result<Option<Record>> {
        if self.eof {
            return Ok(None);
        }
        loop {
            self.line.clear();
            let n = match self.inner.read_until(b'\n', &mut self.line) {
                Ok(n) => n,
                Err(e) => {
                    self.eof = true;
                    return Err(e.into());
                }
            };
            if n == 0 {
                self.eof = true;
                return Ok(self.pending.take().map(Pending::into_record));
            }
            self.bytes_read += n as u64;
            self.lines_read += 1;

            let line = trim_line_end(&self.line);
            if line.first() == Some(&self.format.start_marker()) {
                let next = parse_header(&line[1..], self.format.name_separator());
                if next.is_none() {
                    self.lines_skipped += 1;
                }
                let finished = std::mem::replace(&mut self.pending, next);
                if let Some(finished) = finished {
                    return Ok(Some(finished.into_record()));
                }
            } else if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            } else if let Some(pending) = self.pending.as_mut() {
                pending
                    .sequence
                    .extend(line.iter().copied().filter(|b| !b.is_ascii_whitespace()));
            } else {
                self.lines_skipped += 1;
            }
        }
    }

    /// Number of lines consumed so far, blank lines included.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Number of lines that did not belong to any record.
    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    /// Number of text bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Percentage of the source consumed, based on the position in the file.
    ///
    /// Returns 0 when the size of the source is unknown.
    pub fn progress_percent(&self) -> f32 {
        let total = match self.total_bytes {
            Some(total) if total > 0 => total,
            _ => return 0.0,
        };
        let position = match &self.position {
            Some(position) => position.load(Ordering::Relaxed),
            None => self.bytes_read,
        };
        (position as f64 / total as f64 * 100.0).min(100.0) as f32
    }

    pub fn format(&self) -> FormatOptions {
        self.format
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = crate::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl Reader<BoxedReader> {
    /// Creates a reader from a file path.
    ///
    /// Automatically detects and handles compressed files (gzip, zstd, ...)
    /// when the `niffler` feature is enabled. Progress is tracked against
    /// the on-disk size of the file.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::OpenInput`] if the file cannot be opened, or a
    /// decompression error if the compressed stream cannot be set up.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use fasplit::{FormatOptions, Reader};
    ///
    /// # fn main() -> fasplit::Result<()> {
    /// let reader = Reader::from_path("uniprot_sprot.fasta.gz", FormatOptions::default())?;
    /// let mut residues = 0;
    /// for record in reader {
    ///     residues += record?.residues();
    /// }
    /// println!("{} residues", residues);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P, format: FormatOptions) -> crate::Result<Self> {
        let path = path.as_ref();
        let open_err = |source: std::io::Error| SplitError::OpenInput {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(open_err)?;
        let total_bytes = file.metadata().map_err(open_err)?.len();

        let position = Arc::new(AtomicU64::new(0));
        let counted: Box<dyn Read + Send> = Box::new(CountingReader {
            inner: file,
            count: position.clone(),
        });

        #[cfg(feature = "niffler")]
        let rdr = if total_bytes >= MIN_SNIFF_SIZE {
            let (rdr, _format) = niffler::send::get_reader(counted)?;
            rdr
        } else {
            counted
        };
        #[cfg(not(feature = "niffler"))]
        let rdr = counted;

        let mut reader = Self::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, rdr), format)
            .with_total_bytes(total_bytes);
        reader.position = Some(position);
        Ok(reader)
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    &line[..end]
}

/// Splits a header line (marker already removed) into name and description.
fn parse_header(header: &[u8], separator: u8) -> Option<Pending> {
    let (name, description) = match header.iter().position(|&b| b == separator) {
        Some(idx) => (&header[..idx], &header[idx + 1..]),
        None => (header, &[][..]),
    };
    let name = name.trim_ascii();
    if name.is_empty() {
        return None;
    }
    Some(Pending {
        name: name.to_vec(),
        description: description.trim_ascii().to_vec(),
        sequence: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(data: &str) -> (Vec<Record>, Reader<Cursor<&str>>) {
        let mut reader = Reader::new(Cursor::new(data), FormatOptions::default());
        let mut records = Vec::new();
        while let Some(record) = reader.next_record().unwrap() {
            records.push(record);
        }
        (records, reader)
    }

    #[test]
    fn test_reader_multiline_records() {
        let data = ">sp|P1|A desc one\nMKVL\nAAGG\n>sp|P2|B\nQQ\n";
        let (records, reader) = read_all(data);

        assert_eq!(
            records,
            vec![
                Record::new("sp|P1|A", "desc one", "MKVLAAGG"),
                Record::new("sp|P2|B", "", "QQ"),
            ]
        );
        assert_eq!(reader.lines_read(), 5);
        assert_eq!(reader.lines_skipped(), 0);
        assert_eq!(reader.bytes_read(), data.len() as u64);
    }

    #[test]
    fn test_reader_skips_leading_junk() {
        let data = "not fasta\nstill not\n>P1 x\nMK\n";
        let (records, reader) = read_all(data);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, b"P1");
        assert_eq!(reader.lines_skipped(), 2);
        assert_eq!(reader.lines_read(), 4);
    }

    #[test]
    fn test_reader_crlf_and_blank_lines() {
        let data = ">P1 a b\r\nMK V\r\n\r\nLL\r\n\n>P2 c\r\nA\r\n";
        let (records, reader) = read_all(data);

        assert_eq!(records[0], Record::new("P1", "a b", "MKVLL"));
        assert_eq!(records[1], Record::new("P2", "c", "A"));
        assert_eq!(reader.lines_skipped(), 0);
    }

    #[test]
    fn test_reader_header_without_sequence() {
        let data = ">P1 empty\n>P2 full\nMK\n>P3\n";
        let (records, _) = read_all(data);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].sequence, b"");
        assert_eq!(records[1].sequence, b"MK");
        assert_eq!(records[2].sequence, b"");
    }

    #[test]
    fn test_reader_nameless_header_skipped() {
        let data = ">P1\nMK\n> orphan\nQQQ\nRR\n>P2\nA\n";
        let (records, reader) = read_all(data);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, b"MK");
        assert_eq!(records[1].name, b"P2");
        assert_eq!(reader.lines_skipped(), 3);
    }

    #[test]
    fn test_reader_custom_format() {
        let format = FormatOptions::new(b'@', b'|', 60).unwrap();
        let data = "@P1|some desc\nMK\n";
        let mut reader = Reader::new(Cursor::new(data), format);
        let record = reader.next_record().unwrap().unwrap();

        assert_eq!(record, Record::new("P1", "some desc", "MK"));
    }

    #[test]
    fn test_reader_empty_input() {
        let (records, reader) = read_all("");
        assert!(records.is_empty());
        assert_eq!(reader.lines_read(), 0);
        assert_eq!(reader.progress_percent(), 0.0);
    }

    #[test]
    fn test_reader_iterator() {
        let data = ">A\nM\n>B\nK\n>C\nV\n";
        let reader = Reader::new(Cursor::new(data), FormatOptions::default());
        let names: Vec<Vec<u8>> = reader.map(|r| r.unwrap().name).collect();
        assert_eq!(names, vec![b"A".to_vec(), b"B".to_vec(), b"C".to_vec()]);
    }

    #[test]
    fn test_reader_progress() {
        let data = ">A\nMMMM\n>B\nKKKK\n";
        let mut reader =
            Reader::new(Cursor::new(data), FormatOptions::default()).with_total_bytes(data.len() as u64);

        reader.next_record().unwrap();
        let midway = reader.progress_percent();
        assert!(midway > 0.0 && midway < 100.0);

        while reader.next_record().unwrap().is_some() {}
        assert_eq!(reader.progress_percent(), 100.0);
    }

    #[test]
    fn test_reader_from_path_missing() {
        let result = Reader::from_path("no/such/file.fasta", FormatOptions::default());
        assert!(matches!(result, Err(SplitError::OpenInput { .. })));
    }

    #[test]
    fn test_reader_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("small.fasta");
        let data = ">P1 alpha\nMKVLAAGGQQ\n>P2 beta\nMKV\nLL\n";
        std::fs::write(&path, data).unwrap();

        let mut reader = Reader::from_path(&path, FormatOptions::default()).unwrap();
        let mut records = Vec::new();
        while let Some(record) = reader.next_record().unwrap() {
            records.push(record);
        }

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sequence, b"MKVLL");
        assert_eq!(reader.progress_percent(), 100.0);
    }

    #[test]
    fn test_reader_from_tiny_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tiny.fasta");
        std::fs::write(&path, ">P1\nM\n").unwrap();

        let records: Vec<Record> = Reader::from_path(&path, FormatOptions::default())
            .unwrap()
            .collect::<crate::Result<_>>()
            .unwrap();
        assert_eq!(records, vec![Record::new("P1", "", "M")]);
    }

    #[test]
    fn test_reader_keeps_non_utf8_bytes() {
        let data: &[u8] = b">P1 caf\xe9\nMKV\xffL\n>P2 x\nAAAA\n";
        let mut reader = Reader::new(Cursor::new(data), FormatOptions::default());
        let first = reader.next_record().unwrap().unwrap();

        assert_eq!(first.description, b"caf\xe9");
        assert_eq!(first.sequence, b"MKV\xffL");
        assert_eq!(first.residues(), 5);
        assert_eq!(reader.next_record().unwrap().unwrap().residues(), 4);
    }

    #[test]
    fn test_reader_multibyte_residues_count_bytes() {
        let data = ">P1\nMK\u{e9}\n";
        let (records, _) = read_all(data);
        assert_eq!(records[0].sequence, "MK\u{e9}".as_bytes());
        assert_eq!(records[0].residues(), 4);
    }
}
