//! On-disk layout of the collections folder.
//!
//! ```text
//! <collections>/
//!   custom-<name>.cfg   static list: one game key per line
//!   <name>.xcc          dynamic filter definition (see dynamic_filter.rs)
//! ```
//!
//! Game keys in static lists are written relative to a portable root
//! (`./snes/Super Metroid.sfc`) so the list survives moving the whole
//! library to another mount point.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::CollectionError;

const STATIC_PREFIX: &str = "custom-";
const STATIC_EXTENSION: &str = "cfg";
const DYNAMIC_EXTENSION: &str = "xcc";

/// How a custom collection found on disk is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredKind {
    Static,
    Dynamic,
}

/// Where collection files live and how game keys are made portable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPaths {
    pub folder: PathBuf,
    /// Keys under this root are stored as `./relative/path`.
    pub portable_root: PathBuf,
    /// Keys under this directory (but outside the root) are stored as `~/relative/path`.
    pub home: Option<PathBuf>,
}

impl CollectionPaths {
    pub fn new(folder: impl Into<PathBuf>, portable_root: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            portable_root: portable_root.into(),
            home: dirs::home_dir(),
        }
    }

    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// `~/.local/share/retro-shelf/collections` with `~/roms` as the portable root.
    pub fn default_paths() -> Self {
        let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(
            data.join("retro-shelf").join("collections"),
            home.join("roms"),
        )
    }

    pub fn static_list_path(&self, name: &str) -> PathBuf {
        self.folder
            .join(format!("{STATIC_PREFIX}{name}.{STATIC_EXTENSION}"))
    }

    pub fn dynamic_filter_path(&self, name: &str) -> PathBuf {
        self.folder.join(format!("{name}.{DYNAMIC_EXTENSION}"))
    }

    pub fn ensure_folder(&self) -> io::Result<()> {
        fs::create_dir_all(&self.folder)
    }

    /// Scan the collections folder for custom collections.
    ///
    /// A `.xcc` definition marks a name as dynamic even if a static list
    /// with the same name exists. A missing folder yields no collections.
    pub fn discover(&self) -> Result<BTreeMap<String, StoredKind>, CollectionError> {
        let mut found = BTreeMap::new();
        let entries = match fs::read_dir(&self.folder) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(found),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match classify(&path) {
                Some((name, StoredKind::Dynamic)) => {
                    found.insert(name, StoredKind::Dynamic);
                }
                Some((name, StoredKind::Static)) => {
                    found.entry(name).or_insert(StoredKind::Static);
                }
                None => log::info!(
                    "Ignoring unrecognized file in collections folder: {}",
                    path.display()
                ),
            }
        }
        Ok(found)
    }

    /// Render an absolute game path as a portable key.
    pub fn to_portable(&self, path: &Path) -> String {
        if let Some(rel) = relative_below(path, &self.portable_root) {
            return format!("./{}", to_forward_slashes(&rel));
        }
        if let Some(home) = &self.home
            && let Some(rel) = relative_below(path, home)
        {
            return format!("~/{}", to_forward_slashes(&rel));
        }
        path.to_string_lossy().into_owned()
    }

    /// Resolve a portable key back to an absolute path.
    pub fn resolve_portable(&self, key: &str) -> PathBuf {
        if let Some(rel) = key.strip_prefix("./") {
            return self.portable_root.join(rel);
        }
        if let Some(rel) = key.strip_prefix("~/")
            && let Some(home) = &self.home
        {
            return home.join(rel);
        }
        let path = PathBuf::from(key);
        if path.is_absolute() {
            path
        } else {
            self.portable_root.join(path)
        }
    }
}

fn classify(path: &Path) -> Option<(String, StoredKind)> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    if ext.eq_ignore_ascii_case(DYNAMIC_EXTENSION) && !stem.is_empty() {
        return Some((stem.to_string(), StoredKind::Dynamic));
    }
    if ext.eq_ignore_ascii_case(STATIC_EXTENSION) {
        let name = stem.strip_prefix(STATIC_PREFIX)?;
        if !name.is_empty() {
            return Some((name.to_string(), StoredKind::Static));
        }
    }
    None
}

/// `path` relative to `root`, only if it does not climb out of `root`.
fn relative_below(path: &Path, root: &Path) -> Option<PathBuf> {
    if !path.is_absolute() || !root.is_absolute() {
        return None;
    }
    let rel = path.strip_prefix(root).ok()?;
    let escapes = rel
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    (!escapes && !rel.as_os_str().is_empty()).then(|| rel.to_path_buf())
}

fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Read a static list. Blank lines and lines starting with `#` or `0` are
/// skipped, as are lines that are not valid UTF-8.
pub fn read_static_list(path: &Path) -> Result<Vec<String>, CollectionError> {
    let contents = fs::read(path)?;
    let mut keys = Vec::new();
    for (number, raw) in contents.split(|b| *b == b'\n').enumerate() {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line.trim(),
            Err(e) => {
                log::warn!(
                    "Skipping line {} of {}: {}",
                    number + 1,
                    path.display(),
                    e
                );
                continue;
            }
        };
        if line.is_empty() || line.starts_with('#') || line.starts_with('0') {
            continue;
        }
        keys.push(line.to_string());
    }
    Ok(keys)
}

/// Write a static list atomically (write to temp, then rename).
pub fn write_static_list<S: AsRef<str>>(path: &Path, keys: &[S]) -> Result<(), CollectionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut contents = String::new();
    for key in keys {
        contents.push_str(key.as_ref());
        contents.push('\n');
    }
    let tmp = path.with_extension("cfg.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/persistence_tests.rs"]
mod tests;
