//! Sequential byte sources
//!
//! Every extractor reads the executable through [`ByteSource`], a positioned
//! reader with absolute seeks and little-endian word reads. Two backings exist:
//!
//! - [`FileSource`]: reads from a file on disk, opening it lazily on first use
//! - [`MemorySource`]: reads from a borrowed buffer, used to re-parse data the
//!   RLE decoder already produced
//!
//! Reads past the end of either backing fail with
//! [`FormatError::SourceExhausted`]. Read lengths are driven by headers the
//! caller trusts, so no source attempts partial reads.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{FormatError, FormatResult};

/// Positioned reader over a file or buffer
pub trait ByteSource {
    /// Move the cursor to an absolute offset
    fn seek(&mut self, offset: u64) -> FormatResult<()>;

    /// Current absolute offset of the cursor
    fn position(&self) -> u64;

    /// Fill `buf` completely, advancing the cursor
    fn read_exact(&mut self, buf: &mut [u8]) -> FormatResult<()>;

    /// Read a single byte
    fn read_u8(&mut self) -> FormatResult<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a 4-byte little-endian word
    fn read_u32_le(&mut self) -> FormatResult<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read `len` bytes into a new vector
    fn read_bytes(&mut self, len: usize) -> FormatResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a fixed-length field of `len` bytes as ASCII text.
    ///
    /// All `len` bytes are consumed. The text stops at the first NUL and any
    /// byte outside the ASCII range becomes `?`.
    fn read_fixed_string(&mut self, len: usize) -> FormatResult<String> {
        let raw = self.read_bytes(len)?;
        let text = raw
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| {
                if b.is_ascii() {
                    char::from(b)
                } else {
                    '?'
                }
            })
            .collect();
        Ok(text)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn seek(&mut self, offset: u64) -> FormatResult<()> {
        (**self).seek(offset)
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> FormatResult<()> {
        (**self).read_exact(buf)
    }
}

/// Byte source backed by a file on disk.
///
/// The file is not opened until the first seek or read. Seeking an unopened
/// source opens it directly at the requested offset.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    position: u64,
}

impl FileSource {
    /// Create a source for `path` without touching the filesystem
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: None,
            position: 0,
        }
    }

    /// Open `path` immediately, positioned at `offset`
    pub fn open_at(path: impl Into<PathBuf>, offset: u64) -> FormatResult<Self> {
        let mut source = Self::new(path);
        source.seek(offset)?;
        Ok(source)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file has been opened yet
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    fn reader(&mut self) -> FormatResult<&mut BufReader<File>> {
        if self.reader.is_none() {
            trace!(
                "Opening {} at offset {:#x}",
                self.path.display(),
                self.position
            );
            let mut reader = BufReader::new(File::open(&self.path)?);
            if self.position != 0 {
                reader.seek(SeekFrom::Start(self.position))?;
            }
            self.reader = Some(reader);
        }

        self.reader
            .as_mut()
            .ok_or_else(|| FormatError::Io(std::io::Error::other("file source not open")))
    }
}

impl ByteSource for FileSource {
    fn seek(&mut self, offset: u64) -> FormatResult<()> {
        if self.reader.is_none() {
            // Opening picks up the pending position
            self.position = offset;
            self.reader()?;
            return Ok(());
        }

        self.reader()?.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> FormatResult<()> {
        let offset = self.position;
        let result = self.reader()?.read_exact(buf);
        match result {
            Ok(()) => {
                self.position += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                // A short read already consumed the tail, rewind so the
                // cursor still matches `position`
                self.reader()?.seek(SeekFrom::Start(offset))?;
                Err(FormatError::SourceExhausted {
                    offset,
                    requested: buf.len(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Byte source over a borrowed buffer
#[derive(Debug, Clone)]
pub struct MemorySource<'a> {
    data: &'a [u8],
    position: u64,
}

impl<'a> MemorySource<'a> {
    /// Wrap `data`, positioned at its start
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// The whole backing buffer
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes left between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        usize::try_from(self.position)
            .map_or(0, |pos| self.data.len().saturating_sub(pos))
    }
}

impl ByteSource for MemorySource<'_> {
    fn seek(&mut self, offset: u64) -> FormatResult<()> {
        // Seeking past the end is allowed, the next read reports it
        self.position = offset;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> FormatResult<()> {
        let exhausted = FormatError::SourceExhausted {
            offset: self.position,
            requested: buf.len(),
        };

        let Ok(start) = usize::try_from(self.position) else {
            return Err(exhausted);
        };
        let Some(bytes) = start
            .checked_add(buf.len())
            .and_then(|end| self.data.get(start..end))
        else {
            return Err(exhausted);
        };

        buf.copy_from_slice(bytes);
        self.position += buf.len() as u64;
        Ok(())
    }
}
