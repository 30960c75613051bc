//! The validated in-memory genotype matrix.

use serde::{Deserialize, Serialize};

use crate::parse::MalformedInputError;

/// Information about a genetic marker (variant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerInfo {
    /// Marker/variant ID (e.g. rsID or "chr:pos").
    pub id: String,
    /// Chromosome (e.g. "1", "22", "X"), if known.
    pub chrom: Option<String>,
    /// Position in base pairs, if known. Required only for plotting.
    pub pos: Option<u64>,
    /// Reference allele, if known.
    pub ref_allele: Option<String>,
    /// Alternative allele, if known.
    pub alt_allele: Option<String>,
}

impl MarkerInfo {
    /// Build marker info from a header token.
    ///
    /// Tokens of the form `chr:pos` or `chr:pos:ref:alt` carry their
    /// own coordinates; anything else (e.g. a bare rsID) is kept as an
    /// opaque ID with no coordinates.
    pub fn from_header_token(token: &str) -> Self {
        let parts: Vec<&str> = token.split(':').collect();
        if parts.len() >= 2 {
            if let Ok(pos) = parts[1].parse::<u64>() {
                let chrom = parts[0].trim_start_matches("chr").to_string();
                let (ref_allele, alt_allele) = if parts.len() >= 4 {
                    (Some(parts[2].to_string()), Some(parts[3].to_string()))
                } else {
                    (None, None)
                };
                return Self {
                    id: token.to_string(),
                    chrom: Some(chrom),
                    pos: Some(pos),
                    ref_allele,
                    alt_allele,
                };
            }
        }
        Self {
            id: token.to_string(),
            chrom: None,
            pos: None,
            ref_allele: None,
            alt_allele: None,
        }
    }
}

/// Declared type of the phenotype column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhenotypeKind {
    /// Binary or multi-class labels; tested with the chi-square engine.
    Categorical,
    /// Numeric trait; tested with the regression engine.
    Continuous,
}

/// Phenotype values aligned with sample order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Phenotype {
    /// Class labels; `None` = missing.
    Categorical(Vec<Option<String>>),
    /// Numeric values; NaN = missing.
    Continuous(Vec<f64>),
}

impl Phenotype {
    /// Number of phenotype entries.
    pub fn len(&self) -> usize {
        match self {
            Phenotype::Categorical(v) => v.len(),
            Phenotype::Continuous(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The declared kind of this phenotype.
    pub fn kind(&self) -> PhenotypeKind {
        match self {
            Phenotype::Categorical(_) => PhenotypeKind::Categorical,
            Phenotype::Continuous(_) => PhenotypeKind::Continuous,
        }
    }
}

/// A validated sample-by-marker genotype matrix.
///
/// Dosages are stored sample-major: `dosages[i][j]` is sample `i` at
/// marker `j`, in `{0, 1, 2}` for hard calls or any finite value for
/// quantitative dosage. Missing values are NaN.
///
/// Invariants (enforced at construction): every dosage row has
/// `markers.len()` entries, sample IDs are unique, and an attached
/// phenotype is aligned with the sample order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenotypeMatrix {
    sample_ids: Vec<String>,
    markers: Vec<MarkerInfo>,
    dosages: Vec<Vec<f64>>,
    phenotype: Option<Phenotype>,
}

impl GenotypeMatrix {
    /// Construct a matrix, checking the shape and uniqueness invariants.
    pub fn new(
        sample_ids: Vec<String>,
        markers: Vec<MarkerInfo>,
        dosages: Vec<Vec<f64>>,
    ) -> Result<Self, MalformedInputError> {
        if sample_ids.len() != dosages.len() {
            return Err(MalformedInputError::ShapeMismatch {
                expected: sample_ids.len(),
                found: dosages.len(),
            });
        }
        for (i, row) in dosages.iter().enumerate() {
            if row.len() != markers.len() {
                return Err(MalformedInputError::RaggedRow {
                    row: i + 1,
                    expected: markers.len(),
                    found: row.len(),
                });
            }
        }
        let mut seen = std::collections::HashSet::new();
        for id in &sample_ids {
            if !seen.insert(id.as_str()) {
                return Err(MalformedInputError::DuplicateSampleId { id: id.clone() });
            }
        }
        Ok(Self {
            sample_ids,
            markers,
            dosages,
            phenotype: None,
        })
    }

    /// Attach an externally supplied phenotype vector, aligned with
    /// sample order.
    pub fn with_phenotype(mut self, phenotype: Phenotype) -> Result<Self, MalformedInputError> {
        if phenotype.len() != self.sample_ids.len() {
            return Err(MalformedInputError::PhenotypeLengthMismatch {
                expected: self.sample_ids.len(),
                found: phenotype.len(),
            });
        }
        self.phenotype = Some(phenotype);
        Ok(self)
    }

    pub(crate) fn set_phenotype(&mut self, phenotype: Phenotype) {
        debug_assert_eq!(phenotype.len(), self.sample_ids.len());
        self.phenotype = Some(phenotype);
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn n_markers(&self) -> usize {
        self.markers.len()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn markers(&self) -> &[MarkerInfo] {
        &self.markers
    }

    pub fn phenotype(&self) -> Option<&Phenotype> {
        self.phenotype.as_ref()
    }

    /// Dosage row for sample `i`.
    pub fn sample_row(&self, i: usize) -> &[f64] {
        &self.dosages[i]
    }

    /// Dosage values for marker `j` across all samples (column copy).
    pub fn marker_column(&self, j: usize) -> Vec<f64> {
        self.dosages.iter().map(|row| row[j]).collect()
    }

    /// Minor allele frequency for marker `j`, treating dosages as
    /// 0..2 alt-allele counts. Returns NaN when every value is missing.
    pub fn maf(&self, j: usize) -> f64 {
        let mut sum = 0.0;
        let mut n = 0usize;
        for row in &self.dosages {
            let d = row[j];
            if !d.is_nan() {
                sum += d;
                n += 1;
            }
        }
        if n == 0 {
            return f64::NAN;
        }
        let af = sum / (2.0 * n as f64);
        af.min(1.0 - af)
    }

    /// Count of missing genotype cells over the whole matrix.
    pub fn missing_cell_count(&self) -> usize {
        self.dosages
            .iter()
            .map(|row| row.iter().filter(|d| d.is_nan()).count())
            .sum()
    }

    /// Per-sample missing fraction, in sample order.
    pub fn sample_missing_fractions(&self) -> Vec<f64> {
        let m = self.markers.len();
        self.dosages
            .iter()
            .map(|row| {
                if m == 0 {
                    0.0
                } else {
                    row.iter().filter(|d| d.is_nan()).count() as f64 / m as f64
                }
            })
            .collect()
    }
}
