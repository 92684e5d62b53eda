use super::model::ObservationTable;
use crate::config::{LOWER_QUANTILE, UPPER_QUANTILE};

// ---------------------------------------------------------------------------
// Quantiles
// ---------------------------------------------------------------------------

/// Quantile `q` (in `[0, 1]`) of `values`, linearly interpolated between the
/// closest ranks (`rank = q * (n - 1)`).  NaN values are skipped.
///
/// Returns `None` if every value is NaN.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let rank = q * (sorted.len() - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(sorted.len() - 1);
    let fraction = rank - lower_idx as f64;

    Some(sorted[lower_idx] + (sorted[upper_idx] - sorted[lower_idx]) * fraction)
}

/// Inclusive value range retained by the outlier filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileBounds {
    pub lower: f64,
    pub upper: f64,
}

impl QuantileBounds {
    /// Bounds for the `[lower_q, upper_q]` quantile band of `values`.
    pub fn of(values: &[f64], lower_q: f64, upper_q: f64) -> Option<Self> {
        Some(Self {
            lower: quantile(values, lower_q)?,
            upper: quantile(values, upper_q)?,
        })
    }

    /// Whether `value` lies inside the band.  NaN never does.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

// ---------------------------------------------------------------------------
// Percentile filter
// ---------------------------------------------------------------------------

/// Output of [`remove_outliers`].
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub table: ObservationTable,
    /// `None` when the input had no usable values.
    pub bounds: Option<QuantileBounds>,
    pub removed: usize,
}

/// Drop observations outside the central 95% of the value distribution.
///
/// Bounds are computed once over the unfiltered values; the filter is not
/// re-applied to its own output.
pub fn remove_outliers(table: ObservationTable) -> FilterOutcome {
    filter_by_quantiles(table, LOWER_QUANTILE, UPPER_QUANTILE)
}

/// Keep observations whose value lies in the `[lower_q, upper_q]` quantile
/// band of the input's values.
pub fn filter_by_quantiles(table: ObservationTable, lower_q: f64, upper_q: f64) -> FilterOutcome {
    let input_len = table.len();
    let bounds = QuantileBounds::of(&table.values(), lower_q, upper_q);

    let kept: ObservationTable = match bounds {
        Some(b) => table
            .observations
            .into_iter()
            .filter(|obs| {
                let keep = b.contains(obs.value);
                if !keep {
                    log::debug!("Dropping outlier {} = {}", obs.date, obs.value);
                }
                keep
            })
            .collect(),
        None => ObservationTable::default(),
    };

    let removed = input_len - kept.len();
    match bounds {
        Some(b) => log::info!(
            "Outlier filter kept [{:.3}, {:.3}]: removed {removed} of {input_len} observations",
            b.lower,
            b.upper
        ),
        None => log::warn!("No numeric values to filter; all {input_len} observations dropped"),
    }

    FilterOutcome {
        table: kept,
        bounds,
        removed,
    }
}
