use crate::StatsError;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::{
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// File name suffix of AppMaps found when walking a directory.
pub const APPMAP_SUFFIX: &str = ".appmap.json";

/// Where AppMap bytes come from.
pub trait Filesystem {
    type File: Read;

    fn open(&self, path: &Path) -> io::Result<Self::File>;
}

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    type File = File;

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }
}

/// AppMaps admitted for processing, plus the ones turned away for being too large.
#[derive(Debug, Default)]
pub struct Discovery {
    pub appmaps: Vec<PathBuf>,
    pub skipped: Vec<StatsError>,
}

impl Discovery {
    fn consider(&mut self, path: &Path, size: u64, max_size: u64) {
        if size > max_size {
            let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy().into_owned();
            warn!("{} is {} bytes, over the {} byte limit", path.display(), size, max_size);
            self.skipped.push(StatsError::InputTooLarge { name, size });
        } else {
            self.appmaps.push(path.to_owned());
        }
    }
}

/// Resolve command line paths into AppMaps. Directories are searched recursively for `*.appmap.json` files,
/// files are taken as they are. Anything over `max_size` bytes is skipped.
pub fn find_appmaps(paths: &[PathBuf], max_size: u64) -> Result<Discovery> {
    let mut discovery = Discovery::default();
    for path in paths {
        let metadata = fs::metadata(path).with_context(|| format!("cannot access {}", path.display()))?;
        if !metadata.is_dir() {
            discovery.consider(path, metadata.len(), max_size);
            continue;
        }
        debug!("searching {} for AppMaps", path.display());
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.with_context(|| format!("error walking {}", path.display()))?;
            if entry.file_type().is_file() && is_appmap(entry.path()) {
                let size = entry.metadata().with_context(|| format!("cannot access {}", entry.path().display()))?.len();
                discovery.consider(entry.path(), size, max_size);
            }
        }
    }
    Ok(discovery)
}

fn is_appmap(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()).map_or(false, |name| name.ends_with(APPMAP_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{create_dir_all, write};

    #[test]
    fn test_find_appmaps() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        create_dir_all(root.join("tmp/appmap/rspec")).unwrap();
        write(root.join("tmp/appmap/rspec/b_test.appmap.json"), br#"{"events": []}"#).unwrap();
        write(root.join("tmp/appmap/rspec/a_test.appmap.json"), br#"{"events": []}"#).unwrap();
        write(root.join("tmp/appmap/rspec/huge.appmap.json"), vec![b' '; 64]).unwrap();
        write(root.join("tmp/appmap/rspec/notes.json"), b"{}").unwrap();
        write(root.join("explicit.json"), b"{}").unwrap();

        let discovery = find_appmaps(&[root.join("tmp"), root.join("explicit.json")], 32).unwrap();
        assert_eq!(
            discovery.appmaps,
            vec![
                root.join("tmp/appmap/rspec/a_test.appmap.json"),
                root.join("tmp/appmap/rspec/b_test.appmap.json"),
                root.join("explicit.json"),
            ]
        );
        assert_eq!(discovery.skipped.len(), 1);
        assert_eq!(discovery.skipped[0].to_string(), "File huge.appmap.json too big, skipped");
        assert!(!discovery.skipped[0].is_fatal());
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_appmaps(&[dir.path().join("nope")], u64::MAX).is_err());
    }

    #[test]
    fn test_os_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.appmap.json");
        write(&path, b"{}").unwrap();
        let mut contents = String::new();
        OsFilesystem.open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "{}");
        assert!(OsFilesystem.open(&dir.path().join("b.appmap.json")).is_err());
    }
}
