//! Read-only archive indexing.
//!
//! ## Parsing Strategy
//!
//! The archive is parsed back to front. The End of Central Directory
//! record is located first by scanning backwards from the end of the
//! stream, then the central directory it points at is read in one shot
//! and split into entry records. Local file headers and entry payloads
//! are never touched; everything the index knows comes from the
//! directory.
//!
//! Entries are kept sorted by local header offset, not in directory
//! order. Directory order is whatever the archive writer felt like, and
//! every downstream consumer (listing, span arithmetic in the editor)
//! wants disk layout order.

use std::io::Cursor;

use super::error::{Error, Result};
use super::structures::{EndOfCentralDirectory, ZipEntry};
use crate::io::ReadAt;

/// Hard upper bound for the EOCD backward scan: a comment can be at most
/// 65535 bytes, plus the fixed-size record itself.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Everything the central directory says about an archive.
pub(crate) struct Directory {
    pub eocd: EndOfCentralDirectory,
    /// Archive comment bytes trailing the EOCD, preserved verbatim.
    pub comment: Vec<u8>,
    /// Entries sorted by ascending local header offset.
    pub entries: Vec<ZipEntry>,
    /// Offset where the central directory begins.
    pub dir_start: u64,
}

/// Locates the End of Central Directory record.
///
/// Tries the common case first: an archive without a comment has its
/// EOCD in the last 22 bytes. Failing that, scans backwards through the
/// largest possible comment window for a signature whose comment length
/// field agrees with its position.
///
/// # Returns
///
/// The parsed record and its byte offset in the stream.
fn find_eocd<R: ReadAt>(reader: &R) -> Result<(EndOfCentralDirectory, u64)> {
    let size = reader.size();
    let record = EndOfCentralDirectory::SIZE as u64;

    if size >= record {
        let offset = size - record;
        let mut buf = [0u8; EndOfCentralDirectory::SIZE];
        reader.read_exact_at(offset, &mut buf)?;
        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            return Ok((EndOfCentralDirectory::from_bytes(&buf)?, offset));
        }
    }

    let search_size = (MAX_COMMENT_SIZE + record).min(size);
    let search_start = size - search_size;
    let mut buf = vec![0u8; search_size as usize];
    reader.read_exact_at(search_start, &mut buf)?;

    for i in (0..buf.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
        if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                let record_bytes = &buf[i..i + EndOfCentralDirectory::SIZE];
                let eocd = EndOfCentralDirectory::from_bytes(record_bytes)?;
                return Ok((eocd, search_start + i as u64));
            }
        }
    }

    Err(Error::Format("end of central directory record not found"))
}

/// Reads and validates the full central directory of an archive.
///
/// Shared by the read-only index and the editor so both see the same
/// picture of the archive.
pub(crate) fn read_directory<R: ReadAt>(reader: &R) -> Result<Directory> {
    let (eocd, eocd_offset) = find_eocd(reader)?;
    if eocd.is_zip64() {
        return Err(Error::Format("zip64 archives are not supported"));
    }
    if eocd.disk_number != 0 || eocd.disk_with_cd != 0 || eocd.disk_entries != eocd.total_entries {
        return Err(Error::Format("multi-disk archives are not supported"));
    }

    let mut comment = vec![0u8; eocd.comment_len as usize];
    reader.read_exact_at(eocd_offset + EndOfCentralDirectory::SIZE as u64, &mut comment)?;

    let dir_start = eocd.cd_offset as u64;
    let mut cd = vec![0u8; eocd.cd_size as usize];
    reader.read_exact_at(dir_start, &mut cd).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::Format("central directory extends past end of stream")
        } else {
            Error::Io(e)
        }
    })?;

    let mut entries = Vec::with_capacity(eocd.total_entries as usize);
    let mut cursor = Cursor::new(cd.as_slice());
    for _ in 0..eocd.total_entries {
        entries.push(ZipEntry::parse(&mut cursor)?);
    }

    entries.sort_by_key(|e| e.header_offset);
    for pair in entries.windows(2) {
        if pair[0].header_offset == pair[1].header_offset {
            return Err(Error::Format("two entries share a local header offset"));
        }
    }
    if let Some(last) = entries.last() {
        if last.header_offset >= dir_start {
            return Err(Error::Format("entry offset points inside the central directory"));
        }
    }

    Ok(Directory { eocd, comment, entries, dir_start })
}

/// A read-only view of a ZIP archive's central directory.
///
/// Opening an index parses the directory once and keeps it in memory;
/// the stream is released as soon as the parse completes. Use
/// [`ZipEditor`](super::ZipEditor) instead when entries need to be
/// removed.
#[derive(Debug)]
pub struct ZipIndex {
    entries: Vec<ZipEntry>,
    dir_start: u64,
}

impl ZipIndex {
    /// Opens an archive and indexes its central directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] when the stream is not a usable ZIP
    /// archive: no EOCD record, a Zip64 archive, a truncated or
    /// malformed directory, or entry offsets that cannot be trusted.
    pub fn open<R: ReadAt>(reader: R) -> Result<Self> {
        let dir = read_directory(&reader)?;
        Ok(Self {
            entries: dir.entries,
            dir_start: dir.dir_start,
        })
    }

    /// Entries in ascending local header offset order.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Looks up an entry by its stored name.
    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Offset where the central directory begins.
    pub fn dir_start(&self) -> u64 {
        self.dir_start
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
