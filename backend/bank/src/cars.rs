//! # Car Dataset
//!
//! In-memory rows of the car listings CSV and the dropdown projections built from them.
//!
//! ## Columns
//! - `company` (**string**), `name` (**string**, the model), `year` (**int**), `fuel_type` (**string**)
//! - Anything else in the file (`Price`, `kms_driven`, the unnamed index column) is ignored
//!
//! ## Year Coercion
//! - The year cell is trimmed and parsed as an integer
//! - Empty or non-numeric years drop the whole row at load time, with a warning carrying the count
//! - No placeholder year ever makes it into the projections
//!
//! ## Projections
//! - Recomputed on every call, dataset is a few thousand rows at most
//! - Deduplicated through a `BTreeSet` so ordering falls out for free
use std::{collections::BTreeSet, io::Read};

use serde::Deserialize;
use tracing::{info, warn};

use crate::BankError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRecord {
    pub company: String,
    pub name: String,
    pub year: i32,
    pub fuel_type: String,
}

#[derive(Deserialize)]
struct CsvRow {
    company: String,
    name: String,
    year: String,
    fuel_type: String,
}

impl CsvRow {
    fn into_record(self) -> Option<CarRecord> {
        let year = self.year.trim().parse().ok()?;

        Some(CarRecord {
            company: self.company,
            name: self.name,
            year,
            fuel_type: self.fuel_type,
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct Dataset {
    records: Vec<CarRecord>,
}

impl Dataset {
    pub fn new(records: Vec<CarRecord>) -> Self {
        Self { records }
    }

    /// Parses a CSV stream with a header row. Rows without a numeric year are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BankError> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for row in csv_reader.deserialize::<CsvRow>() {
            match row?.into_record() {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("Dropped {dropped} rows with a missing or non-numeric year");
        }

        info!("Parsed {} car records", records.len());

        Ok(Self { records })
    }

    pub fn records(&self) -> &[CarRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn companies(&self) -> Vec<String> {
        unique_sorted(self.records.iter().map(|car| &car.company))
    }

    pub fn models(&self, company: &str) -> Vec<String> {
        unique_sorted(
            self.records
                .iter()
                .filter(|car| car.company == company)
                .map(|car| &car.name),
        )
    }

    /// Newest first.
    pub fn years(&self) -> Vec<i32> {
        let mut years = unique_sorted(self.records.iter().map(|car| &car.year));
        years.reverse();

        years
    }

    pub fn fuel_types(&self) -> Vec<String> {
        unique_sorted(self.records.iter().map(|car| &car.fuel_type))
    }
}

fn unique_sorted<'a, T, I>(values: I) -> Vec<T>
where
    T: Ord + Clone + 'a,
    I: Iterator<Item = &'a T>,
{
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}
