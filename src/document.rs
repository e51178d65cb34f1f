//! Loading a recognizer output directory into a [`Document`].
//!
//! A document directory holds `symbols.txt` (`token<TAB>code` per line) and
//! `confmats.json`, a list of `{"id": "<page>.<line>", "rows": [[..], ..]}`
//! records with raw log-domain scores. Normalized matrices can be cached
//! next to them, keyed by the symbol table and normalization settings.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{NormalizationConfig, SpotterConfig};
use crate::error::SpottingError;
use crate::spotting::normalization::normalize;
use crate::spotting::symbols::split_query_words;
use crate::spotting::{ConfidenceMatrix, SymbolTable};

pub const SYMBOLS_FILE: &str = "symbols.txt";
pub const MATRICES_FILE: &str = "confmats.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// `<page>.<line>`
    pub id: String,
    pub matrix: ConfidenceMatrix,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub symbols: SymbolTable,
    pub lines: Vec<Line>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LineRecord {
    id: String,
    rows: Vec<Vec<f32>>,
}

impl Document {
    pub fn new(name: impl Into<String>, symbols: SymbolTable, lines: Vec<Line>) -> Self {
        Self {
            name: name.into(),
            symbols,
            lines,
        }
    }

    /// Reads, projects and normalizes a document directory, going through
    /// the matrix cache when configured.
    pub fn load(dir: &Path, raw_query: &str, config: &SpotterConfig) -> Result<Self, SpottingError> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.display().to_string());

        let full = SymbolTable::load(&dir.join(SYMBOLS_FILE)).map_err(|e| e.in_document(&name))?;
        let (symbols, columns) = if config.project_symbols {
            let keep: BTreeSet<usize> = split_query_words(raw_query)
                .flat_map(|word| full.resolve_query(word).codes)
                .collect();
            let (projected, columns) = full.project(&keep).map_err(|e| e.in_document(&name))?;
            (projected, Some(columns))
        } else {
            (full, None)
        };

        let cache = cache_path(dir, &symbols, &config.normalization);
        if config.cache.use_cache && cache.exists() {
            tracing::debug!(document = name.as_str(), cache = %cache.display(), "document: reading matrix cache");
            let records = read_records(&cache, "read matrix cache", "parse matrix cache")?;
            let lines = records
                .into_iter()
                .map(|record| {
                    Ok(Line {
                        matrix: ConfidenceMatrix::new(record.rows)?,
                        id: record.id,
                    })
                })
                .collect::<Result<Vec<_>, SpottingError>>()
                .map_err(|e| e.in_document(&name))?;
            return Ok(Self::new(name, symbols, lines));
        }

        let raw = read_records(&dir.join(MATRICES_FILE), "read confmats.json", "parse confmats.json")?;
        let mut normalized = Vec::with_capacity(raw.len());
        for record in raw {
            let rows = match &columns {
                Some(columns) => project_rows(&record.rows, columns)
                    .map_err(|message| SpottingError::malformed(&name, format!("{}: {message}", record.id)))?,
                None => record.rows,
            };
            normalized.push(LineRecord {
                id: record.id,
                rows: normalize(&rows, &config.normalization),
            });
        }

        if config.cache.create_cache {
            if let Err(err) = write_records(&cache, &normalized) {
                tracing::warn!(
                    document = name.as_str(),
                    error = %err,
                    "document: could not write matrix cache"
                );
            }
        }

        let lines = normalized
            .into_iter()
            .map(|record| {
                Ok(Line {
                    matrix: ConfidenceMatrix::new(record.rows)?,
                    id: record.id,
                })
            })
            .collect::<Result<Vec<_>, SpottingError>>()
            .map_err(|e| e.in_document(&name))?;
        Ok(Self::new(name, symbols, lines))
    }

    /// Rejects documents the matcher cannot work on: zero-row lines and
    /// matrices narrower than the symbol table.
    pub fn validate(&self) -> Result<(), SpottingError> {
        let width = self.symbols.width();
        for line in &self.lines {
            if line.matrix.is_empty() {
                return Err(SpottingError::malformed(
                    &self.name,
                    format!("line {} has no rows", line.id),
                ));
            }
            if line.matrix.width() < width {
                return Err(SpottingError::malformed(
                    &self.name,
                    format!(
                        "line {} has {} columns, symbol table needs {width}",
                        line.id,
                        line.matrix.width()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// `confmats_<hash>.json`, where the hash covers the symbol table and the
/// normalization settings the cached matrices were produced with.
pub fn cache_path(dir: &Path, symbols: &SymbolTable, normalization: &NormalizationConfig) -> PathBuf {
    let key = format!(
        "{}|{}|{}|{}",
        symbols.fingerprint(),
        normalization.cap,
        normalization.power,
        normalization.use_cap
    );
    let hash = blake3::hash(key.as_bytes()).to_hex();
    dir.join(format!("confmats_{}.json", &hash[..16]))
}

fn project_rows(rows: &[Vec<f32>], columns: &[usize]) -> Result<Vec<Vec<f32>>, String> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|&c| {
                    row.get(c)
                        .copied()
                        .ok_or_else(|| format!("column {c} out of range for width {}", row.len()))
                })
                .collect()
        })
        .collect()
}

fn read_records(
    path: &Path,
    read_context: &'static str,
    parse_context: &'static str,
) -> Result<Vec<LineRecord>, SpottingError> {
    let data = std::fs::read_to_string(path).map_err(|e| SpottingError::io(read_context, e))?;
    serde_json::from_str(&data).map_err(|e| SpottingError::json(parse_context, e))
}

fn write_records(path: &Path, records: &[LineRecord]) -> Result<(), SpottingError> {
    let data =
        serde_json::to_string(records).map_err(|e| SpottingError::json("encode matrix cache", e))?;
    std::fs::write(path, data).map_err(|e| SpottingError::io("write matrix cache", e))
}
