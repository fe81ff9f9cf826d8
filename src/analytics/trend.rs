use crate::data::model::Reading;

/// An ordinary least-squares line fitted to one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendResult {
    /// Change per year.
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination over the valid pairs; `0.0` when the
    /// readings have no variance.
    pub r_squared: f64,
    /// Number of (year, reading) pairs the fit used.
    pub n_samples: usize,
    /// `slope * year + intercept` for every year passed in, including years
    /// whose reading was missing.
    pub fitted: Vec<f64>,
}

impl TrendResult {
    pub fn slope_per_decade(&self) -> f64 {
        self.slope * 10.0
    }

    /// Evaluate the line at `year`.
    pub fn value_at(&self, year: f64) -> f64 {
        self.slope * year + self.intercept
    }
}

/// Fit `value = slope * year + intercept` with the closed-form OLS sums.
///
/// Pairs are formed by position; pairs with a missing reading are dropped.
/// Returns `None` when fewer than two pairs remain or when every remaining
/// year is identical, so the line is undefined.
pub fn compute_linear_trend(years: &[i32], values: &[Reading]) -> Option<TrendResult> {
    let valid: Vec<(i32, f64)> = years
        .iter()
        .zip(values)
        .filter_map(|(&x, y)| y.map(|y| (x, y)))
        .collect();

    let &[(origin, _), ..] = valid.as_slice() else {
        return None;
    };
    if valid.len() < 2 || valid.iter().all(|&(x, _)| x == origin) {
        return None;
    }

    // Sums run on years relative to the first valid year, so the squares
    // stay exact for any i32 year.
    let points: Vec<(f64, f64)> = valid
        .iter()
        .map(|&(x, y)| (f64::from(x) - f64::from(origin), y))
        .collect();

    let n = points.len() as f64;
    let (sum_x, sum_y, sum_xy, sum_xx) = points.iter().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), &(x, y)| (sx + x, sy + y, sxy + x * y, sxx + x * x),
    );

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator <= 0.0 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let local_intercept = (sum_y - slope * sum_x) / n;
    let intercept = local_intercept - slope * f64::from(origin);
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }

    let y_mean = sum_y / n;
    let (ss_res, ss_tot) = points.iter().fold((0.0, 0.0), |(res, tot), &(x, y)| {
        let fit = slope * x + local_intercept;
        (res + (y - fit).powi(2), tot + (y - y_mean).powi(2))
    });
    let r_squared = if ss_tot != 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let fitted = years
        .iter()
        .map(|&year| slope * (f64::from(year) - f64::from(origin)) + local_intercept)
        .collect();

    Some(TrendResult {
        slope,
        intercept,
        r_squared,
        n_samples: points.len(),
        fitted,
    })
}
