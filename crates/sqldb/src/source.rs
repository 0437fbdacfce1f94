//! Migration sources.
//!
//! A [`MigrationSource`] yields name-unique `(name, content)` pairs in any
//! order. The runner wraps them in a [`MigrationSet`], which fixes the
//! execution order: ascending byte-wise by name.

use crate::error::{MigrationError, MigrationResult};
use rust_embed::RustEmbed;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Default file extension recognised by the built-in sources.
pub const DEFAULT_EXTENSION: &str = "sql";

/// One migration as produced by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    /// Identifying name, usually the file name. Informational only.
    pub name: String,
    /// Raw file content; hashed byte-for-byte.
    pub content: Vec<u8>,
}

impl MigrationScript {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Anything that can enumerate migrations for a run.
pub trait MigrationSource {
    /// Human-readable origin, used in logs and errors.
    fn describe(&self) -> String;

    /// Enumerate all migrations. Order is not significant.
    fn load(&self) -> MigrationResult<Vec<MigrationScript>>;
}

/// The migrations of a single run, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    scripts: Vec<MigrationScript>,
}

impl MigrationSet {
    /// Load from `source`, reject duplicate names and sort.
    pub fn load(source: &(impl MigrationSource + ?Sized)) -> MigrationResult<Self> {
        let origin = source.describe();
        let scripts = source.load()?;
        Self::from_scripts(scripts, &origin)
    }

    fn from_scripts(mut scripts: Vec<MigrationScript>, origin: &str) -> MigrationResult<Self> {
        let mut seen = HashSet::with_capacity(scripts.len());
        for script in &scripts {
            if !seen.insert(script.name.as_str()) {
                return Err(MigrationError::DuplicateName {
                    name: script.name.clone(),
                    origin: origin.to_string(),
                });
            }
        }
        // `String` ordering is byte-wise on UTF-8.
        scripts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { scripts })
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MigrationScript> {
        self.scripts.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scripts.iter().map(|s| s.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a MigrationSet {
    type Item = &'a MigrationScript;
    type IntoIter = std::slice::Iter<'a, MigrationScript>;

    fn into_iter(self) -> Self::IntoIter {
        self.scripts.iter()
    }
}

/// In-memory migrations, for programmatic use and tests.
impl MigrationSource for Vec<MigrationScript> {
    fn describe(&self) -> String {
        format!("{} in-memory migrations", self.len())
    }

    fn load(&self) -> MigrationResult<Vec<MigrationScript>> {
        Ok(self.clone())
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name).extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Files with a given extension directly inside a directory.
///
/// Subdirectories are not descended into.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    path: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// Source reading `*.sql` files from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_extension(path, DEFAULT_EXTENSION)
    }

    /// Source reading `*.<extension>` files from `path`.
    ///
    /// A leading `.` on the extension is ignored.
    pub fn with_extension(path: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            path: path.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MigrationSource for DirectorySource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> MigrationResult<Vec<MigrationScript>> {
        if !self.path.is_dir() {
            return Err(MigrationError::SourceNotFound {
                origin: self.describe(),
            });
        }

        let read_err = |path: &Path, source: std::io::Error| MigrationError::SourceRead {
            path: path.display().to_string(),
            source,
        };

        let entries = std::fs::read_dir(&self.path).map_err(|e| read_err(&self.path, e))?;
        let mut scripts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| read_err(&self.path, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                log::warn!("Skipping non UTF-8 file name: {}", path.display());
                continue;
            };
            if !has_extension(name, &self.extension) {
                continue;
            }
            let content = std::fs::read(&path).map_err(|e| read_err(&path, e))?;
            scripts.push(MigrationScript::new(name, content));
        }
        Ok(scripts)
    }
}

/// Files with a given extension inside a compile-time embedded bundle.
///
/// Files at the bundle root and one directory level below are picked up;
/// anything nested deeper is ignored. Names are the file base names, so two
/// subdirectories holding the same file name is a [`MigrationError::DuplicateName`].
///
/// ```ignore
/// #[derive(rust_embed::RustEmbed)]
/// #[folder = "db/"]
/// struct Bundle;
///
/// let source = EmbeddedSource::<Bundle>::new();
/// ```
pub struct EmbeddedSource<E: RustEmbed> {
    extension: String,
    _bundle: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedSource<E> {
    pub fn new() -> Self {
        Self::with_extension(DEFAULT_EXTENSION)
    }

    pub fn with_extension(extension: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            _bundle: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RustEmbed> MigrationSource for EmbeddedSource<E> {
    fn describe(&self) -> String {
        format!("embedded:{}", std::any::type_name::<E>())
    }

    fn load(&self) -> MigrationResult<Vec<MigrationScript>> {
        let mut scripts = Vec::new();
        for path in E::iter() {
            let segments: Vec<&str> = path.split('/').collect();
            if segments.len() > 2 {
                log::debug!("Ignoring nested embedded file {path}");
                continue;
            }
            let name = segments[segments.len() - 1];
            if !has_extension(name, &self.extension) {
                continue;
            }
            let file = E::get(&path).ok_or_else(|| MigrationError::SourceRead {
                path: path.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "listed in bundle but not retrievable",
                ),
            })?;
            scripts.push(MigrationScript::new(name, file.data.into_owned()));
        }
        Ok(scripts)
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
