use std::io::{self, Read, Seek};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Cabinet,
}

pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    match data {
        [b'M', b'S', b'C', b'F', ..] => Some(ArchiveFormat::Cabinet),
        _ => None,
    }
}

/// Sniff the format from the first bytes and rewind. Inputs shorter than the
/// magic are reported as unknown rather than as an I/O error.
pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ArchiveFormat>> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    reader.rewind()?;
    Ok(detect_format(&header[..filled]))
}
