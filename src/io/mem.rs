use super::{ReadAt, WriteAt};
use std::io;

/// In-memory archive backed by a byte vector.
///
/// Behaves like a file for both indexing and surgery, which keeps the
/// container logic testable without touching the filesystem and lets
/// callers operate on archives they already hold in memory.
#[derive(Debug, Clone, Default)]
pub struct MemBuffer {
    data: Vec<u8>,
}

impl MemBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for MemBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl ReadAt for MemBuffer {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        if offset >= self.data.len() as u64 {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

impl WriteAt for MemBuffer {
    fn write_all_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()> {
        let end = offset as usize + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset as usize..end].copy_from_slice(buf);
        Ok(())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.data.truncate(size as usize);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_past_end_returns_zero() {
        let buf = MemBuffer::new(vec![1, 2, 3]);
        let mut out = [0u8; 4];
        assert_eq!(buf.read_at(3, &mut out).unwrap(), 0);
        assert_eq!(buf.read_at(1, &mut out).unwrap(), 2);
        assert_eq!(&out[..2], &[2, 3]);
    }

    #[test]
    fn write_extends_and_truncate_shrinks() {
        let mut buf = MemBuffer::default();
        buf.write_all_at(2, b"ab").unwrap();
        assert_eq!(buf.as_slice(), &[0, 0, b'a', b'b']);
        buf.truncate(3).unwrap();
        assert_eq!(buf.size(), 3);
    }

    #[test]
    fn read_exact_at_fails_past_end() {
        let buf = MemBuffer::new(vec![0; 4]);
        let mut out = [0u8; 8];
        assert!(buf.read_exact_at(0, &mut out).is_err());
    }
}
