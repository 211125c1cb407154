//! Minimal reader for Windows shell link (`.lnk`) files.
//!
//! Parses just enough of the MS-SHLLINK binary layout to recover the link
//! target: the header flags, the LinkInfo local base path, and the
//! StringData relative path. Everything else is skipped.

/// Fixed size of the shell link header.
const HEADER_SIZE: u32 = 0x4C;

/// LinkFlags bits (MS-SHLLINK 2.1.1).
const HAS_LINK_TARGET_ID_LIST: u32 = 0x01;
const HAS_LINK_INFO: u32 = 0x02;
const HAS_NAME: u32 = 0x04;
const HAS_RELATIVE_PATH: u32 = 0x08;
const IS_UNICODE: u32 = 0x80;

/// LinkInfoFlags bits (MS-SHLLINK 2.3).
const VOLUME_ID_AND_LOCAL_BASE_PATH: u32 = 0x01;

/// Target location recovered from a shell link.
#[derive(Debug, PartialEq)]
pub(crate) enum LnkTarget {
    /// Absolute path from the LinkInfo block.
    Absolute(String),
    /// StringData relative path, to resolve against the shortcut's
    /// own directory.
    Relative(String),
}

/// Extracts the target from raw shell link bytes.
pub(crate) fn read_target(data: &[u8]) -> Result<LnkTarget, String> {
    if data.len() < HEADER_SIZE as usize {
        return Err("file too small for a shell link header".into());
    }
    let header_size = read_u32(data, 0)?;
    if header_size != HEADER_SIZE {
        return Err(format!("unexpected header size 0x{header_size:08x}"));
    }
    let flags = read_u32(data, 20)?;

    let mut pos = HEADER_SIZE as usize;

    if flags & HAS_LINK_TARGET_ID_LIST != 0 {
        let list_size = read_u16(data, pos)? as usize;
        pos += 2 + list_size;
    }

    let mut base_path = None;
    if flags & HAS_LINK_INFO != 0 {
        let info_size = read_u32(data, pos)? as usize;
        if info_size < 0x1C || pos + info_size > data.len() {
            return Err(format!("link info size {info_size} out of bounds at {pos}"));
        }
        base_path = read_link_info(&data[pos..pos + info_size])?;
        pos += info_size;
    }

    let mut relative_path = None;
    if flags & HAS_NAME != 0 {
        let (_, next) = read_string_data(data, pos, flags)?;
        pos = next;
    }
    if flags & HAS_RELATIVE_PATH != 0 {
        let (rel, _) = read_string_data(data, pos, flags)?;
        relative_path = Some(rel);
    }

    match (base_path, relative_path) {
        (Some(base), _) => Ok(LnkTarget::Absolute(base)),
        (None, Some(rel)) => Ok(LnkTarget::Relative(rel)),
        (None, None) => Err("link records no target path".into()),
    }
}

/// Reads the local base path (+ common path suffix) out of a LinkInfo
/// block, preferring the Unicode variants when the header carries them.
fn read_link_info(info: &[u8]) -> Result<Option<String>, String> {
    let header_size = read_u32(info, 4)? as usize;
    let info_flags = read_u32(info, 8)?;
    if info_flags & VOLUME_ID_AND_LOCAL_BASE_PATH == 0 {
        // Network-relative links carry no local base path.
        return Ok(None);
    }

    let base_offset = read_u32(info, 16)? as usize;
    let suffix_offset = read_u32(info, 24)? as usize;

    if header_size >= 0x24 {
        let base_unicode = read_u32(info, 28)? as usize;
        let suffix_unicode = read_u32(info, 32)? as usize;
        if base_unicode != 0 {
            let mut path = read_utf16_z(info, base_unicode)?;
            if suffix_unicode != 0 {
                path.push_str(&read_utf16_z(info, suffix_unicode)?);
            }
            return Ok(Some(path));
        }
    }

    let mut path = read_ansi_z(info, base_offset)?;
    if suffix_offset != 0 {
        path.push_str(&read_ansi_z(info, suffix_offset)?);
    }
    Ok(Some(path))
}

/// Reads one StringData entry: a u16 character count followed by the
/// characters, UTF-16LE when the link is Unicode.
fn read_string_data(data: &[u8], pos: usize, flags: u32) -> Result<(String, usize), String> {
    let count = read_u16(data, pos)? as usize;
    let pos = pos + 2;

    if flags & IS_UNICODE != 0 {
        let byte_len = count * 2;
        if pos + byte_len > data.len() {
            return Err(format!("string data out of bounds at {pos}"));
        }
        let units: Vec<u16> = data[pos..pos + byte_len]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Ok((String::from_utf16_lossy(&units), pos + byte_len))
    } else {
        if pos + count > data.len() {
            return Err(format!("string data out of bounds at {pos}"));
        }
        let s = String::from_utf8_lossy(&data[pos..pos + count]).into_owned();
        Ok((s, pos + count))
    }
}

/// Reads a null-terminated ANSI string at an offset inside a block.
fn read_ansi_z(block: &[u8], offset: usize) -> Result<String, String> {
    if offset >= block.len() {
        return Err(format!("string offset {offset} out of bounds"));
    }
    let mut end = offset;
    while end < block.len() {
        if block[end] == 0x00 {
            return Ok(String::from_utf8_lossy(&block[offset..end]).into_owned());
        }
        end += 1;
    }
    Err(format!("unterminated string at offset {offset}"))
}

/// Reads a null-terminated UTF-16LE string at an offset inside a block.
fn read_utf16_z(block: &[u8], offset: usize) -> Result<String, String> {
    if offset >= block.len() {
        return Err(format!("string offset {offset} out of bounds"));
    }
    let mut units = Vec::new();
    let mut pos = offset;
    while pos + 2 <= block.len() {
        let unit = u16::from_le_bytes([block[pos], block[pos + 1]]);
        if unit == 0 {
            return Ok(String::from_utf16_lossy(&units));
        }
        units.push(unit);
        pos += 2;
    }
    Err(format!("unterminated string at offset {offset}"))
}

fn read_u16(data: &[u8], pos: usize) -> Result<u16, String> {
    if pos + 2 > data.len() {
        return Err(format!("unexpected end of data at {pos}"));
    }
    Ok(u16::from_le_bytes([data[pos], data[pos + 1]]))
}

fn read_u32(data: &[u8], pos: usize) -> Result<u32, String> {
    if pos + 4 > data.len() {
        return Err(format!("unexpected end of data at {pos}"));
    }
    Ok(u32::from_le_bytes([
        data[pos],
        data[pos + 1],
        data[pos + 2],
        data[pos + 3],
    ]))
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-built shell link binaries for tests.

    use super::{HAS_LINK_INFO, HAS_LINK_TARGET_ID_LIST, HAS_RELATIVE_PATH, IS_UNICODE};

    /// Builds a 76-byte header with the given LinkFlags.
    fn header(flags: u32) -> Vec<u8> {
        let mut data = vec![0u8; 0x4C];
        data[0..4].copy_from_slice(&0x4Cu32.to_le_bytes());
        // LinkCLSID is not validated; leave it zeroed.
        data[20..24].copy_from_slice(&flags.to_le_bytes());
        data
    }

    /// Builds a LinkInfo block with an ANSI local base path and suffix.
    fn link_info(base: &str, suffix: &str) -> Vec<u8> {
        let header_size = 0x1Cu32;
        let base_offset = header_size;
        let suffix_offset = base_offset + base.len() as u32 + 1;
        let total = suffix_offset + suffix.len() as u32 + 1;

        let mut info = Vec::new();
        info.extend_from_slice(&total.to_le_bytes());
        info.extend_from_slice(&header_size.to_le_bytes());
        info.extend_from_slice(&1u32.to_le_bytes()); // VolumeIDAndLocalBasePath
        info.extend_from_slice(&0u32.to_le_bytes()); // VolumeIDOffset
        info.extend_from_slice(&base_offset.to_le_bytes());
        info.extend_from_slice(&0u32.to_le_bytes()); // CommonNetworkRelativeLinkOffset
        info.extend_from_slice(&suffix_offset.to_le_bytes());
        info.extend_from_slice(base.as_bytes());
        info.push(0);
        info.extend_from_slice(suffix.as_bytes());
        info.push(0);
        info
    }

    /// A link whose target is an absolute local path.
    pub(crate) fn with_local_base_path(base: &str, suffix: &str) -> Vec<u8> {
        let mut data = header(HAS_LINK_INFO);
        data.extend_from_slice(&link_info(base, suffix));
        data
    }

    /// Same, but preceded by a target ID list the parser must skip.
    pub(crate) fn with_id_list_and_base_path(base: &str) -> Vec<u8> {
        let mut data = header(HAS_LINK_TARGET_ID_LIST | HAS_LINK_INFO);
        let id_list = [0xAAu8; 10];
        data.extend_from_slice(&(id_list.len() as u16).to_le_bytes());
        data.extend_from_slice(&id_list);
        data.extend_from_slice(&link_info(base, ""));
        data
    }

    /// A link that only records an ANSI relative path.
    pub(crate) fn with_relative_path(rel: &str) -> Vec<u8> {
        let mut data = header(HAS_RELATIVE_PATH);
        data.extend_from_slice(&(rel.len() as u16).to_le_bytes());
        data.extend_from_slice(rel.as_bytes());
        data
    }

    /// A Unicode link that only records a relative path.
    pub(crate) fn with_unicode_relative_path(rel: &str) -> Vec<u8> {
        let mut data = header(HAS_RELATIVE_PATH | IS_UNICODE);
        let units: Vec<u16> = rel.encode_utf16().collect();
        data.extend_from_slice(&(units.len() as u16).to_le_bytes());
        for unit in units {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        data
    }
}
