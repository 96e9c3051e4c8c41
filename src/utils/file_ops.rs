//! Filoperationer för arkivhanteringen

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Kontrollera om en sökväg är ett FTZ-arkiv
pub fn is_ftz_path(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref(),
        Some("ftz")
    )
}

/// Hitta alla FTZ-arkiv i en katalog
/// Resultatet sorteras så att körordningen blir deterministisk
pub fn find_ftz_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Kunde inte läsa katalogen {:?}", dir))?;
        if entry.file_type().is_file() && is_ftz_path(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_ftz_path() {
        assert!(is_ftz_path(Path::new("familj.ftz")));
        assert!(is_ftz_path(Path::new("FAMILJ.FTZ")));
        assert!(!is_ftz_path(Path::new("familj.ged")));
        assert!(!is_ftz_path(Path::new("ftz")));
    }

    #[test]
    fn test_find_ftz_files() {
        let dir = tempdir().unwrap();

        // Två arkiv i roten, ett i en underkatalog, en ovidkommande fil
        fs::write(dir.path().join("b.FTZ"), "").unwrap();
        fs::write(dir.path().join("a.ftz"), "").unwrap();
        fs::write(dir.path().join("c.ged"), "").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("d.ftz"), "").unwrap();

        let flat = find_ftz_files(dir.path(), false).unwrap();
        assert_eq!(
            flat,
            vec![dir.path().join("a.ftz"), dir.path().join("b.FTZ")]
        );

        let deep = find_ftz_files(dir.path(), true).unwrap();
        assert_eq!(
            deep,
            vec![
                dir.path().join("a.ftz"),
                dir.path().join("b.FTZ"),
                sub.join("d.ftz")
            ]
        );
    }

    #[test]
    fn test_find_ftz_files_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("finns_inte");

        assert!(find_ftz_files(&missing, false).is_err());
    }
}
