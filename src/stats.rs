//! Pearson and Spearman correlation with two-sided p-values.
//!
//! The p-value comes from the t-statistic t = r·sqrt((n-2)/(1-r²)) under
//! the null of no correlation, approximated through the standard normal
//! survival function (Abramowitz & Stegun 26.2.17) with a small-df
//! adjustment. Degenerate inputs (fewer than two points, zero variance) are
//! reported as explicitly undefined rather than silently zero.

use serde::Serialize;

/// One correlation measurement. `coefficient` is `None` when the input was
/// degenerate; `p_value` is additionally `None` when there are too few
/// points for a test (n < 3) or the correlation is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub coefficient: Option<f64>,
    pub p_value: Option<f64>,
    /// Number of data points.
    pub n: usize,
}

impl Correlation {
    /// Marker for inputs where the coefficient is mathematically undefined.
    pub fn undefined(n: usize) -> Self {
        Correlation {
            coefficient: None,
            p_value: None,
            n,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.coefficient.is_some()
    }
}

/// Pearson linear correlation between x and y.
///
/// Requires x.len() == y.len(). Undefined for n < 2 or when either vector
/// has zero variance. The coefficient is clamped to [-1, 1] against float
/// drift.
pub fn pearson(x: &[f64], y: &[f64]) -> Correlation {
    assert_eq!(x.len(), y.len(), "correlation inputs must have equal length");
    let n = x.len();
    if n < 2 {
        return Correlation::undefined(n);
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < 1e-300 || var_y < 1e-300 {
        return Correlation::undefined(n);
    }

    let r = (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0);
    Correlation {
        coefficient: Some(r),
        p_value: p_value_for(r, n),
        n,
    }
}

/// Spearman rank correlation: Pearson on the mid-rank transforms of x and y.
/// Ties receive the average of the ranks they span.
pub fn spearman(x: &[f64], y: &[f64]) -> Correlation {
    assert_eq!(x.len(), y.len(), "correlation inputs must have equal length");
    if x.len() < 2 {
        return Correlation::undefined(x.len());
    }
    pearson(&midranks(x), &midranks(y))
}

/// Mid-rank transform: 1-based ranks with tied values sharing the average
/// of the ranks they occupy.
fn midranks(v: &[f64]) -> Vec<f64> {
    let n = v.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| v[i].partial_cmp(&v[j]).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && v[order[j + 1]] == v[order[i]] {
            j += 1;
        }
        // Positions i..=j (0-based) share the mean of ranks i+1..=j+1.
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

/// Two-sided p-value for the null r = 0, from the t-statistic with
/// df = n - 2. None when n < 3 (no degrees of freedom).
fn p_value_for(r: f64, n: usize) -> Option<f64> {
    if n < 3 {
        return None;
    }
    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom < 1e-12 {
        // Perfect correlation: t diverges, p collapses to 0.
        return Some(0.0);
    }
    let t = r.abs() * (df / denom).sqrt();
    Some(two_sided_p(t, df))
}

/// Two-sided tail probability of |T| >= t for a t-distribution with `df`
/// degrees of freedom: normal approximation with a deflation correction for
/// small df (which thickens the tails, i.e. raises p).
fn two_sided_p(t_abs: f64, df: f64) -> f64 {
    let z = if df >= 30.0 {
        t_abs
    } else {
        t_abs * (1.0 - 1.0 / (4.0 * df)).max(0.5)
    };
    (2.0 * normal_sf(z)).clamp(0.0, 1.0)
}

/// Standard normal survival function P(Z > z), Abramowitz & Stegun 26.2.17.
fn normal_sf(z: f64) -> f64 {
    if z < 0.0 {
        return 1.0 - normal_sf(-z);
    }
    let t = 1.0 / (1.0 + 0.2316419 * z);
    let d = 0.3989422804014327; // 1/sqrt(2π)
    let poly = t
        * (0.319381530
            + t * (-0.356563782 + t * (1.781477937 + t * (-1.821255978 + t * 1.330274429))));
    (d * (-z * z / 2.0).exp() * poly).clamp(0.0, 1.0)
}
