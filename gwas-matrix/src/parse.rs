//! Delimited-text genotype matrix parser.
//!
//! Layout contract: the first column is the sample identifier, every
//! remaining column is a marker, with an optional designated phenotype
//! column (by name or index). Unparseable genotype cells become
//! missing unless their overall fraction exceeds the rejection
//! threshold, in which case the whole parse fails.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::matrix::{GenotypeMatrix, MarkerInfo, Phenotype, PhenotypeKind};

/// Structural input errors. Fatal to the whole request; no partial
/// matrix is ever returned.
#[derive(Debug, Error)]
pub enum MalformedInputError {
    #[error("input is empty or has no data rows")]
    Empty,

    #[error("row {row} has {found} columns, expected {expected} (per header)")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("duplicate sample id '{id}'")]
    DuplicateSampleId { id: String },

    #[error("phenotype column '{column}' not found in header")]
    PhenotypeColumnNotFound { column: String },

    #[error("phenotype length {found} does not match sample count {expected}")]
    PhenotypeLengthMismatch { expected: usize, found: usize },

    #[error("phenotype column designated without a declared phenotype kind")]
    UndeclaredPhenotypeKind,

    #[error("{found} dosage rows for {expected} samples")]
    ShapeMismatch { expected: usize, found: usize },

    #[error(
        "unparseable cell fraction {fraction:.4} exceeds rejection threshold {threshold:.4}"
    )]
    TooManyMalformedCells { fraction: f64, threshold: f64 },
}

/// Designates a column by header name or zero-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Column separator byte (b',' for CSV, b'\t' for TSV).
    pub delimiter: u8,
    /// Phenotype column, if the phenotype is embedded in the table.
    pub phenotype_column: Option<ColumnRef>,
    /// How to interpret the phenotype column. Required whenever
    /// `phenotype_column` is set; never inferred from the data.
    pub phenotype_kind: Option<PhenotypeKind>,
    /// Maximum tolerated fraction of unparseable genotype cells.
    pub rejection_threshold: f64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            phenotype_column: None,
            phenotype_kind: None,
            rejection_threshold: 0.2,
        }
    }
}

/// Parse a string cell to f64 dosage, treating NA-like tokens as NaN.
///
/// Returns `(value, was_unparseable)`: missing tokens are missing but
/// well-formed; anything else that fails to parse as a finite number
/// is missing AND counted against the rejection threshold.
fn parse_dosage(s: &str) -> (f64, bool) {
    match s {
        "NA" | "na" | "Na" | "." | "" | "-" | "NaN" | "nan" => (f64::NAN, false),
        _ => match s.parse::<f64>() {
            Ok(v) if v.is_finite() => (v, false),
            _ => (f64::NAN, true),
        },
    }
}

/// Parse a phenotype cell as a continuous value.
fn parse_pheno_numeric(s: &str) -> f64 {
    match parse_dosage(s) {
        (v, false) => v,
        (_, true) => f64::NAN,
    }
}

/// Parse a phenotype cell as a categorical label.
fn parse_pheno_label(s: &str) -> Option<String> {
    match s {
        "NA" | "na" | "Na" | "." | "" | "-" | "NaN" | "nan" => None,
        _ => Some(s.to_string()),
    }
}

/// Parse raw delimited text into a validated [`GenotypeMatrix`].
pub fn parse_matrix(
    raw: &str,
    opts: &ParseOptions,
) -> Result<GenotypeMatrix, MalformedInputError> {
    let delim = opts.delimiter as char;
    // Keep physical line numbers: blank lines are skipped but still
    // counted, so RaggedRow reports the line as it appears in the file.
    let mut lines = raw.lines().enumerate();

    let header_line = lines
        .by_ref()
        .find(|(_, l)| !l.trim().is_empty())
        .map(|(_, l)| l)
        .ok_or(MalformedInputError::Empty)?;
    let headers: Vec<&str> = header_line.split(delim).map(|s| s.trim()).collect();
    if headers.len() < 2 {
        return Err(MalformedInputError::Empty);
    }

    // Resolve the phenotype column to an absolute header index.
    let pheno_idx: Option<usize> = match &opts.phenotype_column {
        None => None,
        Some(ColumnRef::Index(i)) => {
            if *i == 0 || *i >= headers.len() {
                return Err(MalformedInputError::PhenotypeColumnNotFound {
                    column: i.to_string(),
                });
            }
            Some(*i)
        }
        Some(ColumnRef::Name(name)) => Some(
            headers
                .iter()
                .position(|h| *h == name.as_str())
                .ok_or_else(|| MalformedInputError::PhenotypeColumnNotFound {
                    column: name.clone(),
                })?,
        ),
    };

    let markers: Vec<MarkerInfo> = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(i, _)| Some(*i) != pheno_idx)
        .map(|(_, h)| MarkerInfo::from_header_token(h))
        .collect();

    let mut sample_ids = Vec::new();
    let mut dosages: Vec<Vec<f64>> = Vec::new();
    let mut pheno_cells: Vec<String> = Vec::new();
    let mut n_unparseable = 0usize;

    for (line_idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delim).map(|s| s.trim()).collect();
        if fields.len() != headers.len() {
            return Err(MalformedInputError::RaggedRow {
                row: line_idx + 1,
                expected: headers.len(),
                found: fields.len(),
            });
        }

        sample_ids.push(fields[0].to_string());

        let mut row = Vec::with_capacity(markers.len());
        for (i, cell) in fields.iter().enumerate().skip(1) {
            if Some(i) == pheno_idx {
                pheno_cells.push(cell.to_string());
                continue;
            }
            let (v, bad) = parse_dosage(cell);
            if bad {
                n_unparseable += 1;
            }
            row.push(v);
        }
        dosages.push(row);
    }

    if sample_ids.is_empty() {
        return Err(MalformedInputError::Empty);
    }

    let total_cells = sample_ids.len() * markers.len();
    if total_cells > 0 {
        let fraction = n_unparseable as f64 / total_cells as f64;
        if fraction > opts.rejection_threshold {
            return Err(MalformedInputError::TooManyMalformedCells {
                fraction,
                threshold: opts.rejection_threshold,
            });
        }
        if n_unparseable > 0 {
            debug!(
                n_unparseable,
                fraction, "recorded unparseable genotype cells as missing"
            );
        }
    }

    let mut matrix = GenotypeMatrix::new(sample_ids, markers, dosages)?;

    if pheno_idx.is_some() {
        // A designated column requires an explicit kind; the parser
        // never infers one from the cell contents.
        let kind = opts
            .phenotype_kind
            .ok_or(MalformedInputError::UndeclaredPhenotypeKind)?;
        let phenotype = match kind {
            PhenotypeKind::Continuous => {
                Phenotype::Continuous(pheno_cells.iter().map(|s| parse_pheno_numeric(s)).collect())
            }
            PhenotypeKind::Categorical => Phenotype::Categorical(
                pheno_cells.iter().map(|s| parse_pheno_label(s)).collect(),
            ),
        };
        matrix.set_phenotype(phenotype);
    }

    Ok(matrix)
}
