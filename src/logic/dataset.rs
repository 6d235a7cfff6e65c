//! Dataset Store - append-only labeled CSV table
//!
//! The artifact is a plain CSV file whose header is `Type` followed by the
//! feature schema. The store never creates the artifact; seeding it is an
//! external concern. Appends are keyed by column name against the stored
//! header, so the request-time computation order never leaks into the file.

use std::fs;
use std::path::PathBuf;

use crate::error::AppError;
use crate::logic::features::{FeatureVector, LABEL_COLUMN};

/// In-memory view of the persisted table.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Handle to the dataset artifact on disk.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the full table. Missing artifact is an error, never an implicit
    /// empty dataset.
    pub fn load(&self) -> Result<Dataset, AppError> {
        if !self.path.exists() {
            return Err(AppError::DatasetNotFound(self.path.display().to_string()));
        }
        let text = fs::read_to_string(&self.path)?;
        parse_csv(&text).map_err(|msg| {
            AppError::DatasetCorrupt(format!("{}: {msg}", self.path.display()))
        })
    }

    /// Append one labeled row and persist the whole table.
    ///
    /// The row is assembled against the stored header before anything is
    /// written: a header column absent from the vector fails the append with
    /// no partial row, while vector features absent from the header are
    /// silently dropped.
    pub fn append(&self, features: &FeatureVector, label: i32) -> Result<(), AppError> {
        let mut dataset = self.load()?;

        let row: Vec<f64> = dataset
            .columns
            .iter()
            .map(|column| {
                if column == LABEL_COLUMN {
                    Ok(f64::from(label))
                } else {
                    features.get(column).ok_or_else(|| {
                        AppError::SchemaMismatch(format!(
                            "dataset column '{column}' missing from feature vector"
                        ))
                    })
                }
            })
            .collect::<Result<_, _>>()?;

        dataset.rows.push(row);
        self.persist(&dataset)
    }

    /// Rewrite the artifact, write-then-rename so readers never see a
    /// half-written table.
    fn persist(&self, dataset: &Dataset) -> Result<(), AppError> {
        let mut out = String::new();
        out.push_str(&dataset.columns.join(","));
        out.push('\n');
        for row in &dataset.rows {
            let fields: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }

        let tmp = self.path.with_extension("csv.tmp");
        fs::write(&tmp, out)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn parse_csv(text: &str) -> Result<Dataset, String> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or("missing header row")?;
    let columns: Vec<String> = header.split(',').map(|c| c.trim().to_string()).collect();

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        let row: Vec<f64> = line
            .split(',')
            .map(|field| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("row {}: non-numeric field '{field}'", i + 1))
            })
            .collect::<Result<_, _>>()?;
        if row.len() != columns.len() {
            return Err(format!(
                "row {}: expected {} fields, got {}",
                i + 1,
                columns.len(),
                row.len()
            ));
        }
        rows.push(row);
    }

    Ok(Dataset { columns, rows })
}
