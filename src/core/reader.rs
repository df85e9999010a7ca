//! Fixed-arity record reader for raw binary and whitespace-separated text.
//!
//! Records have no framing: there is no header and no count. The stream
//! ends where the data ends. A clean end is only recognized at a record
//! boundary, and running out of data anywhere else is reported as a
//! malformed record.

use std::io::{self, BufRead, ErrorKind, Read};

use byteorder::{ByteOrder, NativeEndian, ReadBytesExt};

/// Size in bytes of one binary field.
const FIELD_SIZE: usize = std::mem::size_of::<f32>();

/// How record values are encoded in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Native-endian `f32` values packed back to back.
    #[default]
    Binary,
    /// Decimal tokens separated by any ASCII whitespace.
    Text,
}

/// Result of reading a single record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadOutcome<'a> {
    /// A complete record. Valid until the next read.
    Record(&'a [f32]),
    /// The stream ended cleanly before the first field of a record.
    EndOfStream,
    /// The stream ended, or held garbage, after a record had started.
    Malformed {
        /// Zero-based index of the offending record.
        record: usize,
        /// Field within the record that could not be read.
        field: usize,
        /// Byte offset at which the record started.
        offset: u64,
    },
}

enum Fill {
    Complete,
    Empty,
    Short(usize),
}

/// Reads records of `arity` floats from a buffered stream.
///
/// One value buffer and one token buffer are allocated up front and reused
/// for every record.
pub struct RecordReader<R> {
    inner: R,
    encoding: Encoding,
    values: Vec<f32>,
    token: Vec<u8>,
    position: u64,
    records: usize,
}

impl<R: BufRead> RecordReader<R> {
    /// Creates a reader producing records of `arity` values.
    pub fn new(inner: R, arity: usize, encoding: Encoding) -> Self {
        Self {
            inner,
            encoding,
            values: vec![0.0; arity],
            token: Vec::with_capacity(32),
            position: 0,
            records: 0,
        }
    }

    /// Number of complete records returned so far.
    #[inline]
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Number of bytes consumed from the stream so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next record.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors other than running out of data. End of data is
    /// reported through [`ReadOutcome`].
    pub fn read_record(&mut self) -> io::Result<ReadOutcome<'_>> {
        if self.values.is_empty() {
            return Ok(ReadOutcome::EndOfStream);
        }

        let start = self.position;
        let fill = match self.encoding {
            Encoding::Binary => self.fill_binary()?,
            Encoding::Text => self.fill_text()?,
        };

        match fill {
            Fill::Complete => {
                self.records += 1;
                Ok(ReadOutcome::Record(&self.values))
            }
            Fill::Empty => Ok(ReadOutcome::EndOfStream),
            Fill::Short(field) => Ok(ReadOutcome::Malformed {
                record: self.records,
                field,
                offset: start,
            }),
        }
    }

    fn fill_binary(&mut self) -> io::Result<Fill> {
        // The first field decides between a clean end and a torn record.
        let mut first = [0u8; FIELD_SIZE];
        let got = read_up_to(&mut self.inner, &mut first)?;
        self.position += got as u64;
        match got {
            0 => return Ok(Fill::Empty),
            FIELD_SIZE => self.values[0] = NativeEndian::read_f32(&first),
            _ => return Ok(Fill::Short(0)),
        }

        for i in 1..self.values.len() {
            match self.inner.read_f32::<NativeEndian>() {
                Ok(value) => {
                    self.values[i] = value;
                    self.position += FIELD_SIZE as u64;
                }
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(Fill::Short(i)),
                Err(e) => return Err(e),
            }
        }

        Ok(Fill::Complete)
    }

    fn fill_text(&mut self) -> io::Result<Fill> {
        for i in 0..self.values.len() {
            let parsed = if self.next_token()? {
                parse_token(&self.token)
            } else {
                None
            };

            match parsed {
                Some(value) => self.values[i] = value,
                None if i == 0 => return Ok(Fill::Empty),
                None => return Ok(Fill::Short(i)),
            }
        }

        Ok(Fill::Complete)
    }

    /// Loads the next whitespace-delimited token into `self.token`.
    ///
    /// Returns `false` if the stream holds no further token.
    fn next_token(&mut self) -> io::Result<bool> {
        self.token.clear();

        loop {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                return Ok(false);
            }
            let skipped = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            let found = skipped < buf.len();
            self.inner.consume(skipped);
            self.position += skipped as u64;
            if found {
                break;
            }
        }

        loop {
            let buf = self.inner.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            let taken = buf.iter().take_while(|b| !b.is_ascii_whitespace()).count();
            let done = taken < buf.len();
            self.token.extend_from_slice(&buf[..taken]);
            self.inner.consume(taken);
            self.position += taken as u64;
            if done {
                break;
            }
        }

        Ok(true)
    }
}

fn parse_token(token: &[u8]) -> Option<f32> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Reads until `buf` is full or the stream is exhausted.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
