use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::error::{Error, Result};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::Format("truncated End of Central Directory"));
        }

        // Verify signature
        if &data[0..4] != Self::SIGNATURE {
            return Err(Error::Format("invalid End of Central Directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// Serialize the fixed 22-byte record; the archive comment follows it
    /// on disk and is appended by the caller.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.extend_from_slice(Self::SIGNATURE);
        out.extend_from_slice(&self.disk_number.to_le_bytes());
        out.extend_from_slice(&self.disk_with_cd.to_le_bytes());
        out.extend_from_slice(&self.disk_entries.to_le_bytes());
        out.extend_from_slice(&self.total_entries.to_le_bytes());
        out.extend_from_slice(&self.cd_size.to_le_bytes());
        out.extend_from_slice(&self.cd_offset.to_le_bytes());
        out.extend_from_slice(&self.comment_len.to_le_bytes());
        out
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) signature, the magic a non-empty archive
/// starts with
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";

/// One archived file, as described by its central directory record.
///
/// Every wire field is retained so the directory can be re-serialized
/// after surgery without consulting the original bytes. `header_offset`
/// is the single field surgery rewrites.
#[derive(Debug, Clone)]
pub struct ZipEntry {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    /// Absolute byte offset of this entry's local header
    pub header_offset: u64,
    /// Entry name decoded for display and matching (lossy view of `name_raw`)
    pub name: String,
    /// Entry name exactly as stored in the directory
    pub name_raw: Vec<u8>,
    pub extra: Vec<u8>,
    pub comment: Vec<u8>,
}

impl ZipEntry {
    /// Parse one central directory record at the cursor position.
    ///
    /// Variable-length fields are bounds-checked against the buffer before
    /// they are sliced, so a directory that lies about its lengths fails
    /// with a format error instead of a short read.
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let buf = *cursor.get_ref();
        let base = cursor.position() as usize;
        if buf.len() - base < CDFH_MIN_SIZE {
            return Err(Error::Format("truncated central directory record"));
        }
        if &buf[base..base + 4] != CDFH_SIGNATURE {
            return Err(Error::Format("invalid central directory record"));
        }
        cursor.set_position(base as u64 + 4);

        let version_made_by = cursor.read_u16::<LittleEndian>()?;
        let version_needed = cursor.read_u16::<LittleEndian>()?;
        let flags = cursor.read_u16::<LittleEndian>()?;
        let compression_method = cursor.read_u16::<LittleEndian>()?;
        let last_mod_time = cursor.read_u16::<LittleEndian>()?;
        let last_mod_date = cursor.read_u16::<LittleEndian>()?;
        let crc32 = cursor.read_u32::<LittleEndian>()?;
        let compressed_size = cursor.read_u32::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u32::<LittleEndian>()?;
        let name_len = cursor.read_u16::<LittleEndian>()? as usize;
        let extra_len = cursor.read_u16::<LittleEndian>()? as usize;
        let comment_len = cursor.read_u16::<LittleEndian>()? as usize;
        let disk_number_start = cursor.read_u16::<LittleEndian>()?;
        let internal_attrs = cursor.read_u16::<LittleEndian>()?;
        let external_attrs = cursor.read_u32::<LittleEndian>()?;
        let header_offset = cursor.read_u32::<LittleEndian>()?;

        let mut pos = cursor.position() as usize;
        if buf.len() - pos < name_len + extra_len + comment_len {
            return Err(Error::Format("central directory record overruns buffer"));
        }
        let name_raw = buf[pos..pos + name_len].to_vec();
        pos += name_len;
        let extra = buf[pos..pos + extra_len].to_vec();
        pos += extra_len;
        let comment = buf[pos..pos + comment_len].to_vec();
        pos += comment_len;
        cursor.set_position(pos as u64);

        // Basic (non-Zip64) offset range only; sentinel values mean the
        // real numbers live in an extra field this tool does not honor.
        if compressed_size == 0xFFFFFFFF
            || uncompressed_size == 0xFFFFFFFF
            || header_offset == 0xFFFFFFFF
        {
            return Err(Error::Format("zip64 archives are not supported"));
        }

        let name = String::from_utf8_lossy(&name_raw).to_string();

        Ok(Self {
            version_made_by,
            version_needed,
            flags,
            compression_method: CompressionMethod::from_u16(compression_method),
            last_mod_time,
            last_mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            disk_number_start,
            internal_attrs,
            external_attrs,
            header_offset: header_offset as u64,
            name,
            name_raw,
            extra,
            comment,
        })
    }

    /// Serialize this record, including its current `header_offset`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        out.extend_from_slice(CDFH_SIGNATURE);
        out.extend_from_slice(&self.version_made_by.to_le_bytes());
        out.extend_from_slice(&self.version_needed.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.compression_method.as_u16().to_le_bytes());
        out.extend_from_slice(&self.last_mod_time.to_le_bytes());
        out.extend_from_slice(&self.last_mod_date.to_le_bytes());
        out.extend_from_slice(&self.crc32.to_le_bytes());
        out.extend_from_slice(&self.compressed_size.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_size.to_le_bytes());
        out.extend_from_slice(&(self.name_raw.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.extra.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.comment.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.disk_number_start.to_le_bytes());
        out.extend_from_slice(&self.internal_attrs.to_le_bytes());
        out.extend_from_slice(&self.external_attrs.to_le_bytes());
        out.extend_from_slice(&(self.header_offset as u32).to_le_bytes());
        out.extend_from_slice(&self.name_raw);
        out.extend_from_slice(&self.extra);
        out.extend_from_slice(&self.comment);
        out
    }

    /// On-disk size of this central directory record
    pub fn byte_len(&self) -> usize {
        CDFH_MIN_SIZE + self.name_raw.len() + self.extra.len() + self.comment.len()
    }

    /// Directory entries end with '/'
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}
