//! Catalog loading from TSV and JSON files
//!
//! # TSV layout
//!
//! The first line is a header naming the columns; every following non-empty
//! line is one record. Cells containing `None` or nothing at all are treated
//! as absent. Columns the record type does not know are ignored, so the same
//! files can carry extra annotations. A row may stop short of the header;
//! its trailing columns are absent, which is an error only for required
//! columns. A row longer than the header is rejected.
//!
//! # JSON layout
//!
//! One object with a `gpus` and a `models` array using the same field names
//! as the TSV headers.

use crate::catalog::{Catalog, GpuSpec, ModelSpec};
use crate::precision::Precision;
use gpuplan_shared::{GpuplanError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where each half of the catalog comes from
///
/// Defaults to the built-in catalog. A JSON catalog replaces the whole
/// default; GPU and model TSV files then replace their half.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    pub catalog_json: Option<PathBuf>,
    pub gpu_file: Option<PathBuf>,
    pub model_file: Option<PathBuf>,
}

impl CatalogSource {
    pub fn load(&self) -> Result<Catalog> {
        let mut catalog = match &self.catalog_json {
            Some(path) => load_catalog_json(path)?,
            None => Catalog::builtin(),
        };

        if let Some(path) = &self.gpu_file {
            catalog.gpus = load_gpu_tsv(path)?;
        }
        if let Some(path) = &self.model_file {
            catalog.models = load_model_tsv(path)?;
        }

        catalog.validate()?;
        info!(
            gpus = catalog.gpus.len(),
            models = catalog.models.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }
}

/// Loads a whole catalog from a JSON file
pub fn load_catalog_json(path: &Path) -> Result<Catalog> {
    let content = read_file(path)?;
    let catalog: Catalog = serde_json::from_str(&content).map_err(|e| {
        GpuplanError::catalog_load(
            path.display().to_string(),
            Some(e.line()),
            format!("invalid JSON catalog: {}", e),
            Some(Box::new(e)),
        )
    })?;
    debug!(path = %path.display(), "Parsed JSON catalog");
    Ok(catalog)
}

pub fn load_gpu_tsv(path: &Path) -> Result<Vec<GpuSpec>> {
    let content = read_file(path)?;
    parse_gpu_tsv(&content, &path.display().to_string())
}

pub fn load_model_tsv(path: &Path) -> Result<Vec<ModelSpec>> {
    let content = read_file(path)?;
    parse_model_tsv(&content, &path.display().to_string())
}

/// Parses GPU records; `origin` names the source in error messages
pub fn parse_gpu_tsv(content: &str, origin: &str) -> Result<Vec<GpuSpec>> {
    parse_records(content, origin)?
        .iter()
        .map(|record| -> Result<GpuSpec> {
            let mut gpu = GpuSpec::new(
                record.required_text("name")?,
                record.required_f64("memory_gb")?,
                record.required_f64("memory_bandwidth_gbps")?,
            );
            for precision in Precision::ALL {
                gpu.compute
                    .set(precision, record.optional_f64(precision.compute_key())?);
            }
            gpu.opex_per_day = record.optional_f64("opex_per_day")?;
            gpu.capex = record.optional_f64("capex")?;
            gpu.connectivity = record.text("connectivity").map(str::to_string);
            gpu.architecture = record.text("architecture").map(str::to_string);
            gpu.grace_memory_gb = record.optional_f64("grace_memory_gb")?;
            Ok(gpu)
        })
        .collect()
}

/// Parses model records; `origin` names the source in error messages
pub fn parse_model_tsv(content: &str, origin: &str) -> Result<Vec<ModelSpec>> {
    parse_records(content, origin)?
        .iter()
        .map(|record| -> Result<ModelSpec> {
            let mut model = ModelSpec::new(
                record.required_text("name")?,
                record.required_f64("params_billion")?,
                record.required_u32("d_model")?,
                record.required_u32("n_layers")?,
                record.required_u32("max_context_window")?,
            );
            model.n_heads = record.optional_u32("n_heads")?;
            model.d_head = record.optional_u32("d_head")?;
            Ok(model)
        })
        .collect()
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        GpuplanError::catalog_load(
            path.display().to_string(),
            None,
            format!("cannot read file: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// One data line of a TSV file
struct Record<'a> {
    origin: &'a str,
    line: usize,
    cells: HashMap<&'a str, &'a str>,
}

fn parse_records<'a>(content: &'a str, origin: &'a str) -> Result<Vec<Record<'a>>> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| GpuplanError::catalog_load(origin, None, "missing header row", None))?;
    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();

    lines
        .map(|(line, row)| {
            let values: Vec<&str> = row.split('\t').map(str::trim).collect();
            if values.len() > columns.len() {
                return Err(GpuplanError::catalog_load(
                    origin,
                    Some(line),
                    format!(
                        "expected at most {} cells, found {}",
                        columns.len(),
                        values.len()
                    ),
                    None,
                ));
            }
            // Short rows leave their trailing columns out of the map
            Ok(Record {
                origin,
                line,
                cells: columns.iter().copied().zip(values).collect(),
            })
        })
        .collect()
}

impl<'a> Record<'a> {
    /// Cell text, `None` for missing, empty or `None` cells
    fn text(&self, column: &str) -> Option<&'a str> {
        self.cells
            .get(column)
            .copied()
            .filter(|value| !value.is_empty() && *value != "None")
    }

    fn error(&self, message: String) -> GpuplanError {
        GpuplanError::catalog_load(self.origin, Some(self.line), message, None)
    }

    fn required_text(&self, column: &str) -> Result<&'a str> {
        self.text(column)
            .ok_or_else(|| self.error(format!("missing required column '{}'", column)))
    }

    fn optional_f64(&self, column: &str) -> Result<Option<f64>> {
        self.text(column)
            .map(|value| {
                value.parse::<f64>().map_err(|_| {
                    self.error(format!("column '{}': '{}' is not a number", column, value))
                })
            })
            .transpose()
    }

    fn required_f64(&self, column: &str) -> Result<f64> {
        self.optional_f64(column)?
            .ok_or_else(|| self.error(format!("missing required column '{}'", column)))
    }

    /// Integer cell; whole-valued decimals such as `4096.0` are accepted
    fn optional_u32(&self, column: &str) -> Result<Option<u32>> {
        match self.optional_f64(column)? {
            None => Ok(None),
            Some(value) if value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64 => {
                Ok(Some(value as u32))
            }
            Some(value) => Err(self.error(format!(
                "column '{}': {} is not a non-negative integer",
                column, value
            ))),
        }
    }

    fn required_u32(&self, column: &str) -> Result<u32> {
        self.optional_u32(column)?
            .ok_or_else(|| self.error(format!("missing required column '{}'", column)))
    }
}
