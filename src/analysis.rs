//! Per-modulus analysis pipeline and report assembly.
//!
//! For each requested modulus: classify residues, compute both weight
//! variants, run the twin-counting pass, derive Hardy–Littlewood
//! predictions, and correlate each weight vector against the observed
//! counts. A modulus that fails validation is skipped with a warning; the
//! remaining moduli are unaffected.

use std::time::Instant;

use serde::Serialize;

use crate::density;
use crate::residues::AdmissibleSet;
use crate::sieve;
use crate::stats::{self, Correlation};
use crate::weights::WeightMap;
use crate::AnalysisError;

/// Run configuration. Defaults mirror the original study: N = 10^8 over
/// moduli 16, 30, 42, 60, 210 at 6 decimal places.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Upper bound: twins (p, p+2) with p < n are counted.
    pub n: u64,
    /// Moduli to analyze, processed in the given order.
    pub moduli: Vec<u64>,
    /// Decimal places for table output.
    pub precision: usize,
    /// Use the rayon segment reduction for the counting pass.
    pub parallel: bool,
    /// Override for the iterated-weight iteration budget.
    pub weight_cap: Option<u32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            n: 100_000_000,
            moduli: vec![16, 30, 42, 60, 210],
            precision: 6,
            parallel: true,
            weight_cap: None,
        }
    }
}

/// One table row: a residue with its observed and predicted counts.
#[derive(Debug, Clone, Serialize)]
pub struct ResidueRow {
    pub residue: u64,
    pub count: u64,
    pub prediction: f64,
    /// count / prediction.
    pub ratio: f64,
    pub single_weight: u32,
    /// None when the trajectory hit the iteration cap.
    pub iterated_weight: Option<u32>,
}

/// Pearson and Spearman against the count vector for one weight variant.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CorrelationSummary {
    pub pearson: Correlation,
    pub spearman: Correlation,
}

/// Complete results for one modulus.
#[derive(Debug, Clone, Serialize)]
pub struct ModulusReport {
    pub modulus: u64,
    pub rows: Vec<ResidueRow>,
    pub total_twins: u64,
    /// Residues whose iterated weight did not converge (fell back to 1 in
    /// the prediction and correlation vectors).
    pub nonconverged: Vec<u64>,
    /// Correlations for the single-step weight ν₂(3a+1).
    pub single_step: CorrelationSummary,
    /// Correlations for the iterated Collatz weight k*.
    pub iterated: CorrelationSummary,
}

/// A modulus that was skipped, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedModulus {
    pub modulus: u64,
    pub reason: String,
}

/// Full run artifact, serializable to JSON.
#[derive(Debug, Serialize)]
pub struct AnalysisRun {
    pub n: u64,
    pub reports: Vec<ModulusReport>,
    pub skipped: Vec<SkippedModulus>,
    pub elapsed_secs: f64,
}

/// Analyze a single modulus end to end.
pub fn analyze_modulus(
    n: u64,
    m: u64,
    parallel: bool,
    weight_cap: Option<u32>,
) -> Result<ModulusReport, AnalysisError> {
    let set = AdmissibleSet::new(m)?;
    if set.is_empty() {
        return Err(AnalysisError::EmptyAdmissibleSet(m));
    }

    let weights = WeightMap::compute(&set, weight_cap);
    let counts = sieve::count_twins(n, &set, parallel);

    let mut rows = Vec::with_capacity(set.len());
    for pair in set.pairs() {
        let a = pair.a;
        let count = counts.counts[a as usize];
        let prediction = density::predicted_count(n, &set, &weights, a)?;
        rows.push(ResidueRow {
            residue: a,
            count,
            prediction,
            ratio: count as f64 / prediction,
            single_weight: weights.single(a).unwrap_or(0),
            iterated_weight: weights.iterated(a),
        });
    }

    // Correlation vectors in residue order; non-convergent iterated weights
    // fall back to 1, matching the prediction side.
    let y: Vec<f64> = rows.iter().map(|r| r.count as f64).collect();
    let x_single: Vec<f64> = rows.iter().map(|r| r.single_weight as f64).collect();
    let x_iterated: Vec<f64> = rows.iter().map(|r| r.iterated_weight.unwrap_or(1) as f64).collect();

    Ok(ModulusReport {
        modulus: m,
        total_twins: counts.total,
        nonconverged: weights.nonconverged.clone(),
        single_step: CorrelationSummary {
            pearson: stats::pearson(&x_single, &y),
            spearman: stats::spearman(&x_single, &y),
        },
        iterated: CorrelationSummary {
            pearson: stats::pearson(&x_iterated, &y),
            spearman: stats::spearman(&x_iterated, &y),
        },
        rows,
    })
}

/// Run the full pipeline over every configured modulus.
///
/// The bound is validated once up front (`InvalidBound` aborts the run);
/// per-modulus failures land in `skipped` and do not abort the others.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisRun, AnalysisError> {
    if (config.n as f64) <= std::f64::consts::E {
        return Err(AnalysisError::InvalidBound(config.n));
    }

    let start = Instant::now();
    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    for &m in &config.moduli {
        match analyze_modulus(config.n, m, config.parallel, config.weight_cap) {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!("Warning: skipping modulus {}: {}", m, e);
                skipped.push(SkippedModulus {
                    modulus: m,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(AnalysisRun {
        n: config.n,
        reports,
        skipped,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// Print the per-residue table for one modulus.
pub fn print_report(report: &ModulusReport, precision: usize) {
    let w = 12 + precision;
    println!("\nModulus {}:", report.modulus);
    println!(
        "  {:>8} | {:>12} | {:>w$} | {:>w$}",
        "Residue", "Twins", "HL prediction", "Count/HL",
    );
    println!("  {}", "-".repeat(8 + 12 + 2 * w + 9));
    for row in &report.rows {
        println!(
            "  {:>8} | {:>12} | {:>w$.precision$} | {:>w$.precision$}",
            row.residue, row.count, row.prediction, row.ratio,
        );
    }
    println!("\n  Total twins: {}", report.total_twins);
    if !report.nonconverged.is_empty() {
        println!(
            "  Non-converged residues (weight fell back to 1): {:?}",
            report.nonconverged
        );
    }
}

/// Print the four correlation lines for one modulus.
pub fn print_correlations(report: &ModulusReport) {
    println!("\nMod {} correlations:", report.modulus);
    print_correlation_line("Pearson  (nu2)", "r", report.single_step.pearson);
    print_correlation_line("Spearman (nu2)", "rho", report.single_step.spearman);
    print_correlation_line("Pearson  (k*) ", "r", report.iterated.pearson);
    print_correlation_line("Spearman (k*) ", "rho", report.iterated.spearman);
}

fn print_correlation_line(label: &str, symbol: &str, c: Correlation) {
    match (c.coefficient, c.p_value) {
        (Some(coef), Some(p)) => {
            println!("  {}: {} = {:+.4}, p = {:.4}", label, symbol, coef, p)
        }
        (Some(coef), None) => {
            println!("  {}: {} = {:+.4}, p undefined (n = {})", label, symbol, coef, c.n)
        }
        _ => println!("  {}: undefined (n = {}, or zero variance)", label, c.n),
    }
}
