use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::trend::compute_linear_trend;
use crate::data::filter::filter_by_range;
use crate::data::model::{Reading, TimeSeries};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Request / report shapes (same field names as the analysis endpoint)
// ---------------------------------------------------------------------------

/// Which datasets to compare, over which years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub datasets: Vec<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Pearson r, rounded to 4 decimals. `None` with two or fewer samples.
    pub correlation: Option<f64>,
    /// Two-sided p-value, rounded to 6 decimals.
    pub p_value: Option<f64>,
    pub n_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub slope_per_year: f64,
    pub slope_per_decade: f64,
    pub r_squared: f64,
    pub n_samples: usize,
    /// `"<first valid year>-<last valid year>"`.
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// `correlations[a][b]` for every ordered pair of distinct datasets.
    pub correlations: BTreeMap<String, BTreeMap<String, Correlation>>,
    pub trends: BTreeMap<String, TrendSummary>,
    pub period: Option<String>,
    pub total_years: usize,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Pairwise correlations and per-dataset trends over the requested range.
///
/// Requested keys without a channel in `source` are ignored. The range is
/// applied only when both bounds are given.
pub fn analyze(source: &TimeSeries, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
    if request.datasets.is_empty() {
        return Err(AnalysisError::NoDatasets);
    }

    let view = match (request.start_year, request.end_year) {
        (Some(start), Some(end)) => filter_by_range(source, start, end),
        _ => source.clone(),
    };

    let present: Vec<(&str, &[Reading])> = request
        .datasets
        .iter()
        .filter_map(|key| view.channel(key).map(|values| (key.as_str(), values)))
        .collect();

    let mut correlations: BTreeMap<String, BTreeMap<String, Correlation>> = BTreeMap::new();
    if request.datasets.len() > 1 {
        for (i, (key_a, values_a)) in present.iter().enumerate() {
            let row = correlations.entry(key_a.to_string()).or_default();
            for (j, (key_b, values_b)) in present.iter().enumerate() {
                if i != j {
                    row.insert(key_b.to_string(), correlate(values_a, values_b));
                }
            }
        }
    }

    let mut trends = BTreeMap::new();
    for (key, values) in &present {
        if let Some(summary) = summarize_trend(view.years(), values) {
            trends.insert(key.to_string(), summary);
        }
    }

    let period = view.year_bounds().map(|(first, last)| format!("{first}-{last}"));
    log::debug!(
        "analysis over {:?}: {} correlation rows, {} trends",
        period,
        correlations.len(),
        trends.len()
    );

    Ok(AnalysisReport {
        correlations,
        trends,
        period,
        total_years: view.len(),
    })
}

fn correlate(a: &[Reading], b: &[Reading]) -> Correlation {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    let n_samples = pairs.len();

    if n_samples <= 2 {
        return Correlation {
            correlation: None,
            p_value: None,
            n_samples,
        };
    }

    match pearson(&pairs) {
        Some((r, p)) => Correlation {
            correlation: Some(round_to(r, 4)),
            p_value: Some(round_to(p, 6)),
            n_samples,
        },
        None => Correlation {
            correlation: None,
            p_value: None,
            n_samples,
        },
    }
}

fn summarize_trend(years: &[i32], values: &[Reading]) -> Option<TrendSummary> {
    let valid_years: Vec<i32> = years
        .iter()
        .zip(values)
        .filter(|(_, v)| v.is_some())
        .map(|(&y, _)| y)
        .collect();
    if valid_years.len() <= 2 {
        return None;
    }

    let trend = compute_linear_trend(years, values)?;
    let first = valid_years.first()?;
    let last = valid_years.last()?;

    Some(TrendSummary {
        slope_per_year: round_to(trend.slope, 6),
        slope_per_decade: round_to(trend.slope_per_decade(), 4),
        r_squared: round_to(trend.r_squared, 4),
        n_samples: trend.n_samples,
        period: format!("{first}-{last}"),
    })
}

/// Pearson r with its two-sided p-value under the null of no correlation.
/// `None` when either side has zero variance.
fn pearson(pairs: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (sxy, sxx, syy) = pairs.iter().fold((0.0, 0.0, 0.0), |(sxy, sxx, syy), &(x, y)| {
        let dx = x - mean_x;
        let dy = y - mean_y;
        (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
    });
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let df = n - 2.0;
    let p = if (1.0 - r.abs()) < f64::EPSILON {
        0.0
    } else {
        let t_sq = r * r * df / (1.0 - r * r);
        regularized_incomplete_beta(df / (df + t_sq), df / 2.0, 0.5)
    };
    Some((r, p.clamp(0.0, 1.0)))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// -- Special functions for the Student-t tail --

/// ln Γ(x) by the Lanczos approximation (g = 7, n = 9).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + 7.5;
    let series = COEFFS[1..]
        .iter()
        .enumerate()
        .fold(COEFFS[0], |acc, (i, c)| acc + c / (x + i as f64 + 1.0));
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// I_x(a, b), evaluated with the continued fraction on whichever side
/// converges quickly.
fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-14;
    const TINY: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ln_gamma_matches_factorials() {
        assert_relative_eq!(ln_gamma(1.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(ln_gamma(5.0), 24f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(ln_gamma(0.5), std::f64::consts::PI.sqrt().ln(), epsilon = 1e-12);
    }

    #[test]
    fn incomplete_beta_symmetric_midpoint() {
        assert_relative_eq!(regularized_incomplete_beta(0.5, 2.0, 2.0), 0.5, epsilon = 1e-12);
        // I_x(1, 1) is the uniform CDF
        assert_relative_eq!(regularized_incomplete_beta(0.3, 1.0, 1.0), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn t_tail_with_one_degree_of_freedom() {
        // df = 1 is the Cauchy distribution: P(|T| > 1) = 0.5
        let (df, t_sq) = (1.0, 1.0);
        let p = regularized_incomplete_beta(df / (df + t_sq), df / 2.0, 0.5);
        assert_relative_eq!(p, 0.5, epsilon = 1e-10);
    }
}
