//! Offline featurization of labeled recordings and scaler fitting.
//!
//! Training consumes the JSON lines written here, so training features come
//! from exactly the same [`FeaturePipeline`] that serves predictions.

use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use voicescreen_features::FEATURE_LEN;

use crate::error::DatasetError;
use crate::pipeline::FeaturePipeline;
use crate::scaler::Scaler;

const PATH_COLUMNS: [&str; 2] = ["filepath", "audio_path"];
const REMOTE_SCHEMES: [&str; 4] = ["gs://", "s3://", "http://", "https://"];

/// One row of the metadata table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    pub path: String,
    /// 0 for healthy, 1 for Parkinson's.
    pub label: u8,
}

/// One featurized recording, written as a JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub path: String,
    pub label: u8,
    pub features: Vec<f32>,
}

/// Reads a metadata CSV with a `label` column and a `filepath` or
/// `audio_path` column.
pub fn read_metadata<R: Read>(reader: R) -> Result<Vec<MetadataRow>, DatasetError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let path_idx = PATH_COLUMNS
        .iter()
        .find_map(|&name| column(name))
        .ok_or(DatasetError::MissingColumn("a filepath or audio_path"))?;
    let label_idx = column("label").ok_or(DatasetError::MissingColumn("a label"))?;

    let mut rows = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let path = record.get(path_idx).unwrap_or_default().trim().to_string();
        let raw = record.get(label_idx).unwrap_or_default().trim();
        let label = match raw.parse::<u8>() {
            Ok(label @ (0 | 1)) => label,
            _ => {
                return Err(DatasetError::InvalidLabel {
                    row,
                    value: raw.to_string(),
                })
            }
        };
        rows.push(MetadataRow { path, label });
    }
    Ok(rows)
}

/// Resolves a metadata path against `base`. Remote object-storage URIs are
/// rejected.
pub fn resolve_path(base: &Path, raw: &str) -> Result<PathBuf, DatasetError> {
    if REMOTE_SCHEMES.iter().any(|scheme| raw.starts_with(scheme)) {
        return Err(DatasetError::RemotePath(raw.to_string()));
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(base.join(path))
    }
}

/// Featurizes every row and writes one JSON line per recording to `out`.
///
/// Stops at the first recording that cannot be read or featurized.
/// Returns the number of records written.
pub fn featurize<W: Write>(
    pipeline: &FeaturePipeline,
    rows: &[MetadataRow],
    base: &Path,
    mut out: W,
) -> Result<usize, DatasetError> {
    for (i, row) in rows.iter().enumerate() {
        let path = resolve_path(base, &row.path)?;
        let bytes = std::fs::read(&path).map_err(|source| DatasetError::Io {
            path: path.clone(),
            source,
        })?;
        let features = pipeline
            .features(&bytes)
            .map_err(|source| DatasetError::Featurize {
                path: path.clone(),
                source,
            })?;
        let record = FeatureRecord {
            path: row.path.clone(),
            label: row.label,
            features: features.to_vec(),
        };
        serde_json::to_writer(&mut out, &record).map_err(|e| DatasetError::Stream(e.into()))?;
        out.write_all(b"\n").map_err(DatasetError::Stream)?;
        debug!(index = i, path = %path.display(), label = row.label, "featurized");
    }
    out.flush().map_err(DatasetError::Stream)?;
    info!(records = rows.len(), "featurization complete");
    Ok(rows.len())
}

/// Reads JSON-line feature records. Blank lines are skipped.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<FeatureRecord>, DatasetError> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(DatasetError::Stream)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| DatasetError::Json {
            line: i + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Fits a scaler over feature records, checking every record has the full
/// feature width.
pub fn fit_scaler(records: &[FeatureRecord]) -> Result<Scaler, DatasetError> {
    if let Some((index, r)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.features.len() != FEATURE_LEN)
    {
        return Err(DatasetError::Width {
            index,
            expected: FEATURE_LEN,
            got: r.features.len(),
        });
    }
    let rows: Vec<&[f32]> = records.iter().map(|r| r.features.as_slice()).collect();
    let scaler = Scaler::fit(&rows)?;
    info!(records = records.len(), width = scaler.width(), "fitted scaler");
    Ok(scaler)
}
