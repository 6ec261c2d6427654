use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use once_cell::sync::OnceCell;

use super::loader;
use super::model::SalesDataset;

// ---------------------------------------------------------------------------
// DatasetSource – load once, share read-only
// ---------------------------------------------------------------------------

/// Owns the path to the sales CSV and the dataset read from it.
///
/// The first successful [`get`](Self::get) reads and normalizes the file;
/// later calls hand out the same `Arc`. A failed load is not cached.
#[derive(Debug)]
pub struct DatasetSource {
    path: PathBuf,
    dataset: OnceCell<Arc<SalesDataset>>,
}

impl DatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: OnceCell::new(),
        }
    }

    /// Wrap an already-built dataset (tests, in-memory sources).
    pub fn preloaded(path: impl Into<PathBuf>, dataset: SalesDataset) -> Self {
        Self {
            path: path.into(),
            dataset: OnceCell::with_value(Arc::new(dataset)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.get().is_some()
    }

    /// The normalized dataset, reading the file on first use.
    pub fn get(&self) -> Result<Arc<SalesDataset>> {
        self.dataset
            .get_or_try_init(|| {
                log::debug!("reading sales data from {}", self.path.display());
                loader::load_file(&self.path).map(Arc::new)
            })
            .cloned()
    }
}
