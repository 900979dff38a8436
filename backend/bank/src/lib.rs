//! # Bank
//!
//! Car listings loaded once from CSV and kept in memory for the dropdown endpoints.
//!
//! ## Lifecycle
//! - [`DatasetIndex`] starts `Uninitialized`
//! - [`DatasetIndex::load`] parses the file on the blocking pool and flips it to `Ready`, at most once
//! - Server accepts requests before the load completes, so every query checks the gate first and fails
//!   with [`BankError::NotLoaded`] instead of answering from a half-built dataset
//! - A failed load leaves the gate `Uninitialized` until restart, no retry
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};
use tracing::{error, info, warn};

pub mod cars;

use cars::Dataset;

pub const COMPANY_PLACEHOLDER: &str = "Select Company";

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Car data not loaded")]
    NotLoaded,

    #[error("Car data is empty")]
    Empty,

    #[error("Car data already loaded")]
    AlreadyLoaded,

    #[error("Failed to open {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Load task failed: {0}")]
    Task(#[from] JoinError),
}

pub enum IndexState<'a> {
    Uninitialized,
    Ready(&'a Dataset),
}

#[derive(Debug, Default)]
pub struct DatasetIndex {
    dataset: OnceLock<Dataset>,
}

impl DatasetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(dataset: Dataset) -> Self {
        let index = Self::new();
        let _ = index.dataset.set(dataset);

        index
    }

    pub fn state(&self) -> IndexState<'_> {
        match self.dataset.get() {
            Some(dataset) => IndexState::Ready(dataset),
            None => IndexState::Uninitialized,
        }
    }

    pub fn install(&self, dataset: Dataset) -> Result<(), BankError> {
        self.dataset.set(dataset).map_err(|_| BankError::AlreadyLoaded)
    }

    /// Reads the CSV at `path` and installs it. Failures are logged and returned, the index stays empty.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<usize, BankError> {
        if let IndexState::Ready(_) = self.state() {
            warn!("Car data already loaded, ignoring reload");
            return Err(BankError::AlreadyLoaded);
        }

        let path = path.as_ref().to_path_buf();
        info!("Loading car data from {}", path.display());

        let result = match spawn_blocking(move || read_dataset(&path)).await {
            Ok(parsed) => parsed,
            Err(e) => Err(e.into()),
        }
        .and_then(|dataset| {
            let rows = dataset.len();
            self.install(dataset).map(|_| rows)
        });

        match &result {
            Ok(rows) => info!("Car data loaded successfully ({rows} rows)"),
            // lost a race with a concurrent load, the installed dataset stays
            Err(BankError::AlreadyLoaded) => warn!("Car data already loaded, discarding parsed copy"),
            Err(e) => error!("Error reading car data: {e}"),
        }

        result
    }

    fn dataset(&self) -> Result<&Dataset, BankError> {
        match self.state() {
            IndexState::Ready(dataset) => Ok(dataset),
            IndexState::Uninitialized => Err(BankError::NotLoaded),
        }
    }

    /// Sorted companies behind the UI placeholder entry.
    pub fn list_companies(&self) -> Result<Vec<String>, BankError> {
        let dataset = self.dataset()?;

        if dataset.is_empty() {
            return Err(BankError::Empty);
        }

        let mut companies = vec![COMPANY_PLACEHOLDER.to_string()];
        companies.extend(dataset.companies());

        Ok(companies)
    }

    pub fn list_models(&self, company: &str) -> Result<Vec<String>, BankError> {
        Ok(self.dataset()?.models(company))
    }

    pub fn list_years(&self) -> Result<Vec<i32>, BankError> {
        Ok(self.dataset()?.years())
    }

    pub fn list_fuel_types(&self) -> Result<Vec<String>, BankError> {
        Ok(self.dataset()?.fuel_types())
    }
}

pub fn read_dataset(path: &Path) -> Result<Dataset, BankError> {
    let file = File::open(path).map_err(|source| BankError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Dataset::from_reader(io::BufReader::new(file))
}
