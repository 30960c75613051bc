//! gwas-core: Statistical engine for GWAS-RS
//!
//! Turns a parsed genotype matrix into quality-control metrics,
//! per-marker descriptive statistics, association results (chi-square
//! for categorical phenotypes, OLS regression for continuous ones),
//! and plot-ready Manhattan/QQ coordinates. Every analysis is a pure
//! function of one matrix and one configuration; per-marker work fans
//! out over a rayon pool and fans back in deterministically.

pub mod assoc;
pub mod config;
pub mod descriptive;
pub mod pipeline;
pub mod qc;
pub mod rank;
pub mod util;

pub use assoc::result::{AssociationResult, EffectSize, ResultFlags, TestKind};
pub use config::AnalysisConfig;
pub use pipeline::{
    analyze, analyze_cancellable, analyze_matrix, AnalysisError, AnalysisPayload, CancelToken,
};
pub use qc::QcReport;
