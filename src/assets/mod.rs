//! Preview images bundled with the game's asset dump
//!
//! Assets live under `<root>/<type>/.../<name>/<file>`, where an identifier
//! such as `backpack-daedalus-wings` has type `backpack` and folder name
//! `daedaluswings`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::traits::AssetResolver;

pub const DEFAULT_ASSETS_DIR: &str = "assets/assets/textures/skins";

pub struct LocalAssetResolver {
    root: PathBuf,
}

impl LocalAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Top-down search below `dir` for a directory called `target`.
    ///
    /// Each directory's own children are checked before descending into
    /// them, in name order.
    fn find_dir(dir: &Path, target: &str) -> Option<PathBuf> {
        let children = sorted_entries(dir)
            .into_iter()
            .filter(|path| path.is_dir() && !path.is_symlink())
            .collect::<Vec<_>>();

        if let Some(found) = children
            .iter()
            .find(|path| path.file_name().is_some_and(|name| name == target))
        {
            return Some(found.clone());
        }

        children
            .iter()
            .find_map(|child| Self::find_dir(child, target))
    }
}

/// Entries of `dir` sorted by name; unreadable directories are empty
fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries = match fs::read_dir(dir) {
        Ok(read) => read.filter_map(|entry| entry.ok().map(|e| e.path())).collect::<Vec<_>>(),
        Err(e) => {
            debug!("Cannot read {}: {}", dir.display(), e);
            Vec::new()
        }
    };
    entries.sort();
    entries
}

impl AssetResolver for LocalAssetResolver {
    fn resolve(&self, item_id: &str) -> Option<PathBuf> {
        let mut parts = item_id.split('-');
        let item_type = parts.next().filter(|t| !t.is_empty())?;
        let target = parts.collect::<String>();
        if target.is_empty() {
            return None;
        }

        let folder = Self::find_dir(&self.root.join(item_type), &target)?;
        let file = sorted_entries(&folder).into_iter().find(|path| path.is_file());

        if file.is_none() {
            warn!("Asset folder {} is empty", folder.display());
        }
        file
    }
}
