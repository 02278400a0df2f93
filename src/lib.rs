//! Twin prime residue-class statistics with Collatz-derived 2-adic weights.
//!
//! For each requested modulus m the pipeline:
//! 1. classifies the residues a mod m that can host a twin prime pair
//!    (both a and a+2 coprime to m),
//! 2. attaches two weights to each admissible residue: the 2-adic valuation
//!    of 3a+1, and the total valuation accumulated along the Collatz
//!    odd-step-collapse trajectory of a,
//! 3. counts actual twin pairs (p, p+2) with p < N per residue via a
//!    segmented sieve,
//! 4. compares the counts against a weight-adjusted Hardy–Littlewood
//!    prediction, and
//! 5. reports Pearson/Spearman correlation between each weight variant and
//!    the observed counts.
//!
//! The iterated weight relies on Collatz trajectories reaching 1, which is
//! unproven; every trajectory walk carries a hard iteration cap and reports
//! a distinct non-convergence error instead of looping.

pub mod analysis;
pub mod density;
pub mod residues;
pub mod sieve;
pub mod stats;
pub mod weights;

use thiserror::Error;

pub use density::C2;

/// Errors surfaced by the analysis pipeline.
///
/// Per-modulus failures (`InvalidModulus`, `EmptyAdmissibleSet`) are isolated
/// by the pipeline: the offending modulus is skipped with a warning and the
/// remaining moduli proceed. `WeightNonconvergence` is isolated per residue.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid modulus {0}: must be at least 1")]
    InvalidModulus(u64),

    #[error("modulus {0} admits no twin-compatible residues")]
    EmptyAdmissibleSet(u64),

    #[error("bound N = {0} is too small: the density model needs N > e")]
    InvalidBound(u64),

    #[error("iterated weight for residue {residue} did not converge within {cap} steps")]
    WeightNonconvergence { residue: u64, cap: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
