use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::path::PathWrapper;

/// The `DirReader` walks the given directory and collects
/// every fixture file it contains, in a stable order.
#[derive(Debug, Default)]
pub struct DirReader {
    /// Vector containing the files
    files: Vec<PathWrapper>,
}

impl DirReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the test files paths
    pub fn files(&self) -> &[PathWrapper] {
        &self.files
    }

    pub fn into_files(self) -> Vec<PathWrapper> {
        self.files
    }

    /// Walks the given directory, yielding regular files only
    pub fn walk_dir(directory_path: &Path) -> impl Iterator<Item = DirEntry> {
        WalkDir::new(directory_path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|f| f.file_type().is_file())
    }

    /// Walks the given directory and stores the files, sorted by path.
    pub fn walk_dir_and_store_files(mut self, directory_path: &Path) -> Result<Self, eyre::Error> {
        if !directory_path.is_dir() {
            return Err(eyre::eyre!(
                "{} is not a directory",
                directory_path.display()
            ));
        }

        self.files.extend(
            Self::walk_dir(directory_path).map(|entry| PathWrapper::from(entry.into_path())),
        );
        self.files.sort();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_walk_dir_and_store_files() {
        // Given
        let root = tempfile::tempdir().unwrap();
        let st_shift = root.path().join("GeneralStateTests/stShift");
        let st_create = root.path().join("GeneralStateTests/stCreate2");
        fs::create_dir_all(&st_shift).unwrap();
        fs::create_dir_all(&st_create).unwrap();
        fs::write(st_shift.join("shl01_d0g0v0.json"), "{}").unwrap();
        fs::write(st_shift.join(".stub"), "").unwrap();
        fs::write(st_create.join("create2_d0g0v0.json"), "{}").unwrap();

        // When
        let reader = DirReader::new()
            .walk_dir_and_store_files(root.path())
            .unwrap();

        // Then
        let files: Vec<_> = reader
            .files()
            .iter()
            .map(|f| f.relative_to(root.path()).to_string_lossy().to_string())
            .collect();
        assert_eq!(
            files,
            vec![
                "GeneralStateTests/stCreate2/create2_d0g0v0.json",
                "GeneralStateTests/stShift/.stub",
                "GeneralStateTests/stShift/shl01_d0g0v0.json",
            ]
        );
    }

    #[test]
    fn test_walk_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let err = DirReader::new().walk_dir_and_store_files(&root.path().join("missing"));
        assert!(err.is_err());
    }
}
