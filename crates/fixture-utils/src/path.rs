use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PathWrapper(PathBuf);

impl From<PathBuf> for PathWrapper {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for PathWrapper {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<PathWrapper> for PathBuf {
    fn from(path: PathWrapper) -> Self {
        path.0
    }
}

impl Deref for PathWrapper {
    type Target = PathBuf;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PathWrapper {
    /// Returns the parent directory, or an empty path for a root.
    pub fn parent(&self) -> Self {
        Self(self.0.parent().map(Path::to_path_buf).unwrap_or_default())
    }

    pub fn file_stem_to_string(&self) -> String {
        self.0
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Returns the path relative to `base`, or the full path when it is not
    /// located under `base`.
    ///
    /// # Example
    ///
    /// Base: /fixtures/
    /// Path: /fixtures/GeneralStateTests/stExample/add11_d0g0v0.json
    /// Output: GeneralStateTests/stExample/add11_d0g0v0.json
    pub fn relative_to(&self, base: &Path) -> Self {
        Self(
            self.0
                .strip_prefix(base)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| self.0.clone()),
        )
    }
}
