use std::collections::{BTreeMap, BTreeSet};

use super::model::{ObservationTable, YearMonth};

// ---------------------------------------------------------------------------
// Rolling mean
// ---------------------------------------------------------------------------

/// Trailing arithmetic mean over `window` positions.
///
/// Entry `i` is `None` for `i < window - 1`, and also whenever the window
/// ending at `i` contains a NaN.  Otherwise it is the mean of
/// `values[i + 1 - window ..= i]`; an infinite value makes that mean
/// infinite only while it is inside the window.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    // Running sum of the finite values only.
    let mut sum = 0.0;
    let mut nan_count = 0usize;
    let mut inf_count = 0usize;

    for (i, &x) in values.iter().enumerate() {
        match x {
            x if x.is_nan() => nan_count += 1,
            x if x.is_infinite() => inf_count += 1,
            x => sum += x,
        }
        if i >= window {
            match values[i - window] {
                x if x.is_nan() => nan_count -= 1,
                x if x.is_infinite() => inf_count -= 1,
                x => sum -= x,
            }
        }

        if i + 1 < window || nan_count > 0 {
            out.push(None);
        } else if inf_count > 0 {
            let total: f64 = values[i + 1 - window..=i].iter().sum();
            out.push(Some(total / window as f64));
        } else {
            out.push(Some(sum / window as f64));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Monthly averages
// ---------------------------------------------------------------------------

/// Mean value per calendar month, pivoted to years × months.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyAverages {
    means: BTreeMap<YearMonth, f64>,
}

impl MonthlyAverages {
    /// Group by (year, month) and average.  NaN values are skipped; a month
    /// with no numeric value has no entry.
    pub fn from_table(table: &ObservationTable) -> Self {
        let mut groups: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
        for obs in table.observations.iter().filter(|o| !o.value.is_nan()) {
            let (sum, count) = groups.entry(obs.year_month()).or_default();
            *sum += obs.value;
            *count += 1;
        }

        let means = groups
            .into_iter()
            .map(|(key, (sum, count))| (key, sum / count as f64))
            .collect();
        Self { means }
    }

    /// Mean for one month, if the data covers it.
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        self.means.get(&YearMonth { year, month }).copied()
    }

    /// Row labels of the pivot: every year present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.means.keys().map(|k| k.year).collect();
        years.into_iter().collect()
    }

    /// Column labels of the pivot: every month present in any year, ascending.
    pub fn months(&self) -> Vec<u32> {
        let months: BTreeSet<u32> = self.means.keys().map(|k| k.month).collect();
        months.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }
}
