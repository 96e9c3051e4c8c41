//! Öppning av .ftz-arkiv
//!
//! Ett .ftz-arkiv är ett ZIP-arkiv med en trädmapp i roten. Mappen innehåller
//! nyttolasten `node.ftt` och eventuellt ansiktsbilder under `faces/` eller
//! `face/`. Här görs ingen genealogisk tolkning, bara uppackning.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use crate::utils::error::{ConvertError, ConvertResult};

/// Innehållet i ett öppnat .ftz-arkiv
#[derive(Debug, Clone)]
pub struct FtzArchive {
    /// Trädmappens namn i arkivet
    pub tree_name: String,
    /// Råa bytes från node.ftt
    pub payload: Vec<u8>,
    /// Ansiktsbilder (arkivsökvägar), sorterade
    pub face_files: Vec<String>,
}

impl FtzArchive {
    /// Öppna ett .ftz-arkiv och läs ut nyttolasten
    ///
    /// ZIP-handtaget släpps innan funktionen returnerar.
    pub fn open(path: &Path) -> ConvertResult<Self> {
        let file = File::open(path).map_err(|e| {
            ConvertError::archive_corrupt(format!("kunde inte öppna {}: {}", path.display(), e))
        })?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            ConvertError::archive_corrupt(format!("{} är inte ett ZIP-arkiv: {}", path.display(), e))
        })?;

        let entry_names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let tree_name = Self::find_tree_folder(&entry_names)?;
        tracing::debug!("Trädmapp i arkivet: {}", tree_name);

        let payload_name = format!("{}/node.ftt", tree_name);
        let mut payload = Vec::new();
        {
            let mut entry = archive.by_name(&payload_name).map_err(|_| {
                ConvertError::archive_corrupt(format!("nyttolasten {} saknas", payload_name))
            })?;
            entry.read_to_end(&mut payload).map_err(|e| {
                ConvertError::archive_corrupt(format!("kunde inte läsa {}: {}", payload_name, e))
            })?;
        }

        let face_files = Self::collect_faces(&entry_names, &tree_name);

        Ok(Self {
            tree_name,
            payload,
            face_files,
        })
    }

    /// Hitta trädmappen: den alfabetiskt första toppnivåmappen
    fn find_tree_folder(entry_names: &[String]) -> ConvertResult<String> {
        let folders: BTreeSet<&str> = entry_names
            .iter()
            .filter_map(|name| name.split_once('/').map(|(top, _)| top))
            .filter(|top| !top.is_empty())
            .collect();

        match folders.into_iter().next() {
            Some(folder) => Ok(folder.to_string()),
            None => Err(ConvertError::archive_corrupt(
                "ingen trädmapp i arkivet".to_string(),
            )),
        }
    }

    /// Samla ansiktsbilder, både stavningen faces/ och face/ förekommer
    fn collect_faces(entry_names: &[String], tree_name: &str) -> Vec<String> {
        let prefixes = [
            format!("{}/faces/", tree_name),
            format!("{}/face/", tree_name),
        ];

        let mut faces: Vec<String> = entry_names
            .iter()
            .filter(|name| prefixes.iter().any(|p| name.starts_with(p.as_str())))
            .filter(|name| name.to_lowercase().ends_with(".jpg"))
            .cloned()
            .collect();
        faces.sort();
        faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_ftz(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        for (name, bytes) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_open_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("familj.ftz");
        write_ftz(
            &path,
            &[
                ("Min släkt/node.ftt", b"1\t0\t0\n1\n" as &[u8]),
                ("Min släkt/faces/1_2.jpg", b"jpg"),
                ("Min släkt/faces/1.jpg", b"jpg"),
            ],
        );

        let archive = FtzArchive::open(&path).unwrap();
        assert_eq!(archive.tree_name, "Min släkt");
        assert_eq!(archive.payload, b"1\t0\t0\n1\n");
        // Sorterade
        assert_eq!(
            archive.face_files,
            vec![
                "Min släkt/faces/1.jpg".to_string(),
                "Min släkt/faces/1_2.jpg".to_string()
            ]
        );
    }

    #[test]
    fn test_open_accepts_face_spelling() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("familj.ftz");
        write_ftz(
            &path,
            &[
                ("tree/node.ftt", b"0\t0\n" as &[u8]),
                ("tree/face/7.jpg", b"jpg"),
                ("tree/face/karta.png", b"png"),
            ],
        );

        let archive = FtzArchive::open(&path).unwrap();
        // Bara .jpg räknas
        assert_eq!(archive.face_files, vec!["tree/face/7.jpg".to_string()]);
    }

    #[test]
    fn test_open_picks_first_tree_folder() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("familj.ftz");
        write_ftz(
            &path,
            &[
                ("b-trad/node.ftt", b"0\t0\n" as &[u8]),
                ("a-trad/node.ftt", b"1\t0\n1\n"),
            ],
        );

        let archive = FtzArchive::open(&path).unwrap();
        assert_eq!(archive.tree_name, "a-trad");
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trasig.ftz");
        std::fs::write(&path, b"inte ett zip-arkiv").unwrap();

        let err = FtzArchive::open(&path).unwrap_err();
        assert!(matches!(err, ConvertError::ArchiveCorrupt(_)));
    }

    #[test]
    fn test_open_rejects_missing_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("utan_nyttolast.ftz");
        write_ftz(&path, &[("tree/faces/1.jpg", b"jpg" as &[u8])]);

        let err = FtzArchive::open(&path).unwrap_err();
        assert!(matches!(err, ConvertError::ArchiveCorrupt(_)));
    }

    #[test]
    fn test_open_rejects_flat_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("platt.ftz");
        write_ftz(&path, &[("node.ftt", b"0\t0\n" as &[u8])]);

        let err = FtzArchive::open(&path).unwrap_err();
        assert!(matches!(err, ConvertError::ArchiveCorrupt(_)));
    }
}
