use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::num::ParseIntError;
use std::path::Path;
use std::str::FromStr;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// One slot in the picture pool, or [`PictureIndex::UNBOUND`] (`0`) for a
/// device that has never been enrolled. The sentinel is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PictureIndex(u32);

impl PictureIndex {
    pub const UNBOUND: PictureIndex = PictureIndex(0);

    pub fn new(raw: u32) -> Self {
        PictureIndex(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_unbound(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PictureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PictureIndex {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(PictureIndex)
    }
}

/// Set of picture indices already bound to some enrolled identity.
///
/// Serialized as a single comma-joined line; insertion order is preserved
/// across loads and writes so repeated persists are byte-stable. The file is
/// single-writer by design: at most one dialog runs against a given store
/// path at a time, and concurrent invocations race on the whole-file
/// replace with last-writer-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStore {
    indices: Vec<PictureIndex>,
    dirty: bool,
}

impl IndexStore {
    /// Loads the store, treating an absent file as an empty store.
    pub fn load(path: &Path) -> AppResult<IndexStore> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "index store absent, starting empty");
                return Ok(IndexStore::default());
            }
            Err(source) => {
                return Err(AppError::StoreRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        // Sole line, CSV. A fully empty file also counts as an empty store.
        let line = contents.lines().next().unwrap_or("").trim();
        if line.is_empty() {
            return Ok(IndexStore::default());
        }

        let mut indices = Vec::new();
        for token in line.split(',') {
            let index: PictureIndex =
                token.parse().map_err(|err| AppError::StoreCorrupt {
                    path: path.to_path_buf(),
                    message: format!("invalid index '{}': {err}", token.trim()),
                })?;
            if !indices.contains(&index) {
                indices.push(index);
            }
        }

        Ok(IndexStore {
            indices,
            dirty: false,
        })
    }

    pub fn contains(&self, index: PictureIndex) -> bool {
        self.indices.contains(&index)
    }

    /// Appends `index` unless already present. The unbound sentinel is the
    /// caller's job to filter; it is refused here so it can never leak into
    /// the serialized line.
    pub fn add(&mut self, index: PictureIndex) {
        if index.is_unbound() {
            debug!("refusing to add unbound sentinel to index store");
            return;
        }
        if !self.contains(index) {
            self.indices.push(index);
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[PictureIndex] {
        &self.indices
    }

    fn serialize(&self) -> String {
        self.indices
            .iter()
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Writes the whole store back as one comma-joined line, replacing the
    /// prior contents atomically. No-op when nothing was added.
    pub fn persist(&mut self, path: &Path) -> AppResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let write_err = |source: io::Error| AppError::StoreWrite {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
        tmp.write_all(self.serialize().as_bytes())
            .map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(path).map_err(|err| write_err(err.error))?;

        self.dirty = false;
        debug!(path = %path.display(), entries = self.indices.len(), "index store persisted");
        Ok(())
    }
}
