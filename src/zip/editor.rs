//! In-place entry removal.
//!
//! ## Surgery Strategy
//!
//! Removing an entry never rebuilds the archive. The span of bytes
//! belonging to the doomed entry (local header through payload, up to
//! the next entry's local header) is closed over by sliding every later
//! span left by exactly that many bytes, in ascending offset order so a
//! read never overlaps a pending write. The central directory itself is
//! only rewritten once, when [`ZipEditor::finish`] runs: kept records
//! are re-serialized with their adjusted offsets and a fresh End of
//! Central Directory record, then the file is truncated to its new
//! length.
//!
//! There is no rollback. If an IO error interrupts compaction the file
//! holds a mix of moved and unmoved spans under a stale directory, and
//! the editor poisons itself: every later call fails with
//! [`Error::State`] rather than compounding the damage.

use super::error::{Error, Result};
use super::index::read_directory;
use super::structures::{EndOfCentralDirectory, ZipEntry};
use crate::io::WriteAt;

/// A writable handle on a ZIP archive that can remove entries in place.
///
/// All bookkeeping happens against the in-memory directory; the file is
/// only touched by span relocation during [`remove`](Self::remove) and
/// by the directory rewrite in [`finish`](Self::finish). An editor that
/// never removed anything finishes without writing a single byte.
pub struct ZipEditor<F: WriteAt> {
    file: F,
    eocd: EndOfCentralDirectory,
    comment: Vec<u8>,
    /// Kept entries, always sorted by ascending local header offset.
    entries: Vec<ZipEntry>,
    dir_start: u64,
    dirty: bool,
    poisoned: bool,
}

impl<F: WriteAt> ZipEditor<F> {
    /// Opens an archive for editing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for anything
    /// [`ZipIndex::open`](super::ZipIndex::open) would reject; both run
    /// the same directory parse.
    pub fn open(file: F) -> Result<Self> {
        let dir = read_directory(&file)?;
        Ok(Self {
            file,
            eocd: dir.eocd,
            comment: dir.comment,
            entries: dir.entries,
            dir_start: dir.dir_start,
            dirty: false,
            poisoned: false,
        })
    }

    /// Entries still present, in ascending local header offset order.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Looks up a surviving entry by its stored name.
    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Current offset of the (pending) central directory.
    pub fn dir_start(&self) -> u64 {
        self.dir_start
    }

    /// Removes one entry by name, compacting the archive around it.
    ///
    /// Every entry stored after the target slides left by the target's
    /// span; the central directory start moves with them. The directory
    /// itself stays stale on disk until [`finish`](Self::finish).
    ///
    /// # Errors
    ///
    /// [`Error::EntryNotFound`] if no entry carries `name` (the archive
    /// is untouched), [`Error::State`] if a previous removal already
    /// poisoned this editor, [`Error::Io`] if relocation fails mid-way,
    /// which poisons the editor.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if self.poisoned {
            return Err(Error::State("a failed removal left the archive inconsistent"));
        }
        let target = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;

        let start = self.entries[target].header_offset;
        let end = self.span_end(target);
        let shift = end - start;

        // Slide later spans left, lowest offset first, so each write
        // lands on bytes that have already been read or vacated.
        for i in target + 1..self.entries.len() {
            let span_start = self.entries[i].header_offset;
            let span_end = self.span_end(i);
            if let Err(e) = self.relocate(span_start, span_end - span_start, shift) {
                self.poisoned = true;
                return Err(Error::Io(e));
            }
            self.entries[i].header_offset = span_start - shift;
        }

        self.dir_start -= shift;
        self.entries.remove(target);
        self.dirty = true;
        Ok(())
    }

    /// Rewrites the central directory and EOCD record, truncates the
    /// file to its new length, and returns the underlying stream.
    ///
    /// A clean editor (no removals) returns without writing anything.
    ///
    /// # Errors
    ///
    /// [`Error::State`] if a removal previously failed, [`Error::Io`]
    /// if the rewrite itself fails.
    pub fn finish(mut self) -> Result<F> {
        if self.poisoned {
            return Err(Error::State("a failed removal left the archive inconsistent"));
        }
        if !self.dirty {
            return Ok(self.file);
        }

        let mut tail = Vec::new();
        for entry in &self.entries {
            tail.extend_from_slice(&entry.to_bytes());
        }
        let cd_size = tail.len() as u32;

        let eocd = EndOfCentralDirectory {
            disk_number: self.eocd.disk_number,
            disk_with_cd: self.eocd.disk_with_cd,
            disk_entries: self.entries.len() as u16,
            total_entries: self.entries.len() as u16,
            cd_size,
            cd_offset: self.dir_start as u32,
            comment_len: self.comment.len() as u16,
        };
        tail.extend_from_slice(&eocd.to_bytes());
        tail.extend_from_slice(&self.comment);

        self.file.write_all_at(self.dir_start, &tail)?;
        self.file.truncate(self.dir_start + tail.len() as u64)?;
        Ok(self.file)
    }

    /// Where entry `i`'s bytes end: the next entry's local header, or
    /// the central directory for the last entry.
    fn span_end(&self, i: usize) -> u64 {
        match self.entries.get(i + 1) {
            Some(next) => next.header_offset,
            None => self.dir_start,
        }
    }

    /// Moves `len` bytes at `offset` down to `offset - shift`.
    fn relocate(&mut self, offset: u64, len: u64, shift: u64) -> std::io::Result<()> {
        let mut span = vec![0u8; len as usize];
        self.file.read_exact_at(offset, &mut span)?;
        self.file.write_all_at(offset - shift, &span)
    }
}
