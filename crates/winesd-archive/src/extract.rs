use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use tracing::debug;

use crate::detect::{ArchiveFormat, detect_from_reader};
use crate::error::{Error, Result};

/// Pulls one named member out of an archive staged on disk.
pub trait MemberExtractor {
    fn extract(&self, archive: &Path, member: &str) -> Result<Vec<u8>>;
}

impl<E: MemberExtractor + ?Sized> MemberExtractor for &E {
    fn extract(&self, archive: &Path, member: &str) -> Result<Vec<u8>> {
        (**self).extract(archive, member)
    }
}

/// Extractor for Microsoft cabinet archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct CabExtractor;

impl MemberExtractor for CabExtractor {
    fn extract(&self, archive: &Path, member: &str) -> Result<Vec<u8>> {
        let mut file = File::open(archive)?;
        match detect_from_reader(&mut file)? {
            Some(ArchiveFormat::Cabinet) => {}
            None => {
                return Err(Error::UnsupportedFormat {
                    path: archive.to_path_buf(),
                });
            }
        }
        extract_member(file, member)
    }
}

/// Names of every file stored in the cabinet, in directory order.
pub fn list_members<R: Read + Seek>(reader: R) -> Result<Vec<String>> {
    let cabinet = cab::Cabinet::new(reader).map_err(|source| Error::Corrupted { source })?;
    Ok(member_names(&cabinet))
}

/// Decompress the member whose name equals `member`, ignoring ASCII case.
/// Other members are not decompressed.
pub fn extract_member<R: Read + Seek>(reader: R, member: &str) -> Result<Vec<u8>> {
    let mut cabinet = cab::Cabinet::new(reader).map_err(|source| Error::Corrupted { source })?;
    let available = member_names(&cabinet);

    let Some(name) = available.iter().find(|n| n.eq_ignore_ascii_case(member)).cloned() else {
        return Err(Error::MemberNotFound {
            member: member.to_string(),
            available,
        });
    };

    debug!(member = %name, "extracting cabinet member");
    let mut content = Vec::new();
    cabinet
        .read_file(&name)
        .and_then(|mut entry| entry.read_to_end(&mut content))
        .map_err(|source| Error::Corrupted { source })?;
    Ok(content)
}

fn member_names<R: Read + Seek>(cabinet: &cab::Cabinet<R>) -> Vec<String> {
    cabinet
        .folder_entries()
        .flat_map(|folder| folder.file_entries())
        .map(|file| file.name().to_string())
        .collect()
}
