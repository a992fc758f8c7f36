mod local;
mod mem;

pub use local::{LocalFileReader, LocalFileRw};
pub use mem::MemBuffer;

use std::io;

/// Trait for random access reading from a data source
pub trait ReadAt {
    /// Read data at the specified offset into the buffer
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill the buffer exactly from the specified offset
    fn read_exact_at(&self, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(offset, buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "failed to fill whole buffer",
                    ));
                }
                Ok(n) => {
                    let rest = buf;
                    buf = &mut rest[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Trait for random access mutation of a data source.
///
/// Taking `&mut self` means a writer is exclusive for as long as it is
/// borrowed: two mutating operations on the same source cannot overlap.
pub trait WriteAt: ReadAt {
    /// Write the whole buffer at the specified offset
    fn write_all_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()>;

    /// Cut the data source down to `size` bytes
    fn truncate(&mut self, size: u64) -> io::Result<()>;
}
