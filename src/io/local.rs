use super::{ReadAt, WriteAt};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Local file reader with random access support
pub struct LocalFileReader {
    file: File,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

impl ReadAt for LocalFileReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        file_read_at(&self.file, offset, buf)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Local file opened for in-place mutation.
///
/// Constructing one is the only way to get a writable handle on an archive,
/// and it fails if the file cannot be opened read+write.
pub struct LocalFileRw {
    file: File,
    size: u64,
}

impl LocalFileRw {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

impl ReadAt for LocalFileRw {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        file_read_at(&self.file, offset, buf)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

impl WriteAt for LocalFileRw {
    fn write_all_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.write_all_at(buf, offset)?;
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            let mut written = 0;
            while written < buf.len() {
                let n = self
                    .file
                    .seek_write(&buf[written..], offset + written as u64)?;
                if n == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write whole buffer",
                    ));
                }
                written += n;
            }
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Seek, SeekFrom, Write};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(buf)?;
        }

        self.size = self.size.max(offset + buf.len() as u64);
        Ok(())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.file.set_len(size)?;
        self.size = size;
        Ok(())
    }
}

fn file_read_at(file: &File, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.read_at(buf, offset)
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::FileExt;
        file.seek_read(buf, offset)
    }

    #[cfg(not(any(unix, windows)))]
    {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = file;
        file.seek(SeekFrom::Start(offset))?;
        file.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reader_reads_at_offset() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello world").unwrap();

        let reader = LocalFileReader::new(tmp.path()).unwrap();
        assert_eq!(reader.size(), 11);

        let mut buf = [0u8; 5];
        reader.read_exact_at(6, &mut buf).unwrap();
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn rw_overwrites_and_truncates() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"abcdefgh").unwrap();

        let mut rw = LocalFileRw::open(tmp.path()).unwrap();
        rw.write_all_at(2, b"XY").unwrap();
        rw.truncate(6).unwrap();
        assert_eq!(rw.size(), 6);

        let mut buf = [0u8; 6];
        rw.read_exact_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"abXYef");
    }

    #[test]
    fn rw_open_fails_on_missing_file() {
        assert!(LocalFileRw::open(Path::new("/no/such/file.jar")).is_err());
    }
}
