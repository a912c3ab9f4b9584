//! Jar/zip archive access.
//!
//! The one place that touches the container format. Everything it hands
//! out is either an entry name or an owned byte buffer; no zip types leak.

mod enumerator;

pub use enumerator::{ClassEnumerator, DEFAULT_CLASS_ROOTS};

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error while reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read zip archive '{path}': {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("entry '{entry}' unreadable: {source}")]
    Entry {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },
}

/// One compiled unit pulled out of the archive: entry name plus its raw
/// bytes, owned so a worker task can take it without touching the reader.
#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A jar (or plain zip) of compiled classes.
pub struct JarArchive {
    path: PathBuf,
    inner: ZipArchive<BufReader<File>>,
}

impl JarArchive {
    /// Open the container. This is the only fatal failure point of a
    /// scan; everything after it degrades per entry.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let inner =
            ZipArchive::new(BufReader::new(file)).map_err(|source| ArchiveError::Zip {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("opened {} with {} entries", path.display(), inner.len());
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Entry names in archive order, so repeated scans see the same
    /// sequence.
    pub fn entry_names(&mut self) -> Result<Vec<String>, ArchiveError> {
        let mut names = Vec::with_capacity(self.inner.len());
        for index in 0..self.inner.len() {
            let entry = self
                .inner
                .by_index_raw(index)
                .map_err(|source| ArchiveError::Zip {
                    path: self.path.clone(),
                    source,
                })?;
            names.push(entry.name().to_string());
        }
        Ok(names)
    }

    /// Read one entry into an owned buffer.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let mut entry = self
            .inner
            .by_name(name)
            .map_err(|source| ArchiveError::Entry {
                entry: name.to_string(),
                source,
            })?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| ArchiveError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(bytes)
    }

    /// Whether an entry holds a compiled unit, by suffix convention.
    pub fn is_class_entry(name: &str) -> bool {
        name.ends_with(".class")
    }
}
