//! gwas-matrix: Genotype matrix IO for GWAS-RS
//!
//! Parses delimited sample-by-marker genotype text into a validated
//! in-memory matrix, with optional categorical or continuous phenotype
//! attachment. Missing values are represented as NaN throughout.

pub mod matrix;
pub mod parse;

pub use matrix::{GenotypeMatrix, MarkerInfo, Phenotype, PhenotypeKind};
pub use parse::{parse_matrix, ColumnRef, MalformedInputError, ParseOptions};
