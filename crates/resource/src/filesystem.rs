//! Asset directory provider.
//!
//! Every path is resolved under a root directory. Paths that would leave the
//! root (`..` components, absolute paths, symlinks pointing outside) are
//! refused with `NotFound`.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use ticketpress_traits::{ResourceError, ResourceProvider, SharedResourceData};

#[derive(Debug)]
pub struct FilesystemResourceProvider {
    root: PathBuf,
    /// Canonical form of `root`, when it exists.
    canonical_root: Option<PathBuf>,
}

impl FilesystemResourceProvider {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let canonical_root = root.canonicalize().ok();
        Self {
            root,
            canonical_root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        // `file://` references from the form are treated as root-relative.
        let relative = reference
            .strip_prefix("file://")
            .unwrap_or(reference)
            .trim_start_matches("./");
        let relative = Path::new(relative);
        if relative.is_absolute() {
            return None;
        }
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return None;
        }

        let candidate = self.root.join(relative);
        match (candidate.canonicalize(), &self.canonical_root) {
            (Ok(resolved), Some(root)) => resolved.starts_with(root).then_some(resolved),
            _ => Some(candidate),
        }
    }
}

impl ResourceProvider for FilesystemResourceProvider {
    fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let resolved = self
            .resolve(path)
            .ok_or_else(|| ResourceError::NotFound(format!("{} (outside asset root)", path)))?;

        match std::fs::read(&resolved) {
            Ok(bytes) => Ok(Arc::new(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResourceError::NotFound(path.to_string()))
            }
            Err(e) => Err(ResourceError::LoadFailed {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "FilesystemResourceProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_assets_under_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/bg.jpg"), b"jpeg bytes").unwrap();

        let provider = FilesystemResourceProvider::new(dir.path());
        assert_eq!(&*provider.load("img/bg.jpg").unwrap(), b"jpeg bytes");
        assert_eq!(&*provider.load("file://img/bg.jpg").unwrap(), b"jpeg bytes");
        assert_eq!(&*provider.load("./img/bg.jpg").unwrap(), b"jpeg bytes");
    }

    #[test]
    fn missing_asset_is_not_found() {
        let dir = tempdir().unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());
        assert!(matches!(provider.load("qr.png"), Err(ResourceError::NotFound(_))));
    }

    #[test]
    fn refuses_paths_outside_root() {
        let dir = tempdir().unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());

        for reference in ["../secret.png", "img/../../x.png", "/etc/passwd", ".."] {
            assert!(provider.load(reference).is_err(), "{reference}");
            match provider.load(reference) {
                Err(ResourceError::NotFound(msg)) => assert!(msg.contains("outside"), "{reference}"),
                other => panic!("{reference}: {other:?}"),
            }
        }
    }

    #[test]
    fn directories_are_not_loadable() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());
        assert!(matches!(
            provider.load("img"),
            Err(ResourceError::LoadFailed { .. })
        ));
        assert_eq!(provider.root(), dir.path());
    }
}
