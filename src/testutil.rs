//! Hand-assembled archive fixtures for unit tests.
//!
//! Entries are written STORED with fixed DOS timestamps and a zero CRC so
//! tests control every byte and every offset; nothing here validates
//! payloads, only structure.

const FIXTURE_TIME: u16 = 0x6B32;
const FIXTURE_DATE: u16 = 0x5991;

/// Local header + payload for one stored entry.
fn local_entry(name: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(30 + name.len() + payload.len());
    out.extend_from_slice(b"PK\x03\x04");
    out.extend_from_slice(&20u16.to_le_bytes()); // version needed
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&0u16.to_le_bytes()); // method: stored
    out.extend_from_slice(&FIXTURE_TIME.to_le_bytes());
    out.extend_from_slice(&FIXTURE_DATE.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // crc32
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&(name.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // extra len
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Central directory record for one stored entry.
fn central_record(name: &str, payload: &[u8], header_offset: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(46 + name.len());
    out.extend_from_slice(b"PK\x01\x02");
    out.extend_from_slice(&20u16.to_le_bytes()); // version made by
    out.extend_from_slice(&20u16.to_le_bytes()); // version needed
    out.extend_from_slice(&0u16.to_le_bytes()); // flags
    out.extend_from_slice(&0u16.to_le_bytes()); // method: stored
    out.extend_from_slice(&FIXTURE_TIME.to_le_bytes());
    out.extend_from_slice(&FIXTURE_DATE.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // crc32
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&(name.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // extra len
    out.extend_from_slice(&0u16.to_le_bytes()); // comment len
    out.extend_from_slice(&0u16.to_le_bytes()); // disk number start
    out.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
    out.extend_from_slice(&0u32.to_le_bytes()); // external attrs
    out.extend_from_slice(&header_offset.to_le_bytes());
    out.extend_from_slice(name.as_bytes());
    out
}

/// Build a stored archive with the central directory records emitted in
/// `cd_order` (indices into `entries`) and an optional archive comment.
pub fn stored_archive_opts(
    entries: &[(&str, &[u8])],
    cd_order: Option<&[usize]>,
    comment: &[u8],
) -> Vec<u8> {
    let mut data = Vec::new();
    let mut offsets = Vec::with_capacity(entries.len());
    for (name, payload) in entries {
        offsets.push(data.len() as u32);
        data.extend_from_slice(&local_entry(name, payload));
    }

    let dir_start = data.len() as u32;
    let default_order: Vec<usize> = (0..entries.len()).collect();
    let order = cd_order.unwrap_or(&default_order);
    for &i in order {
        let (name, payload) = entries[i];
        data.extend_from_slice(&central_record(name, payload, offsets[i]));
    }
    let cd_size = data.len() as u32 - dir_start;

    data.extend_from_slice(b"PK\x05\x06");
    data.extend_from_slice(&0u16.to_le_bytes()); // disk number
    data.extend_from_slice(&0u16.to_le_bytes()); // disk with cd
    data.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    data.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    data.extend_from_slice(&cd_size.to_le_bytes());
    data.extend_from_slice(&dir_start.to_le_bytes());
    data.extend_from_slice(&(comment.len() as u16).to_le_bytes());
    data.extend_from_slice(comment);
    data
}

/// Build a stored archive: directory in disk order, no comment.
pub fn stored_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    stored_archive_opts(entries, None, b"")
}

/// On-disk span of one stored entry (local header + name + payload).
pub fn entry_span(name: &str, payload: &[u8]) -> u64 {
    30 + name.len() as u64 + payload.len() as u64
}
