use std::fmt;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Observation – one row of the table
// ---------------------------------------------------------------------------

/// A single daily measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    /// Page-view count; NaN when the source cell was empty.
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    /// Calendar (year, month) the observation falls in.
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.date.year(),
            month: self.date.month(),
        }
    }
}

// ---------------------------------------------------------------------------
// YearMonth – grouping key for monthly aggregation
// ---------------------------------------------------------------------------

/// Calendar month key; orders by year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1 = January … 12 = December.
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// ObservationTable – the loaded series
// ---------------------------------------------------------------------------

/// The series in file order, indexed by date.
///
/// Dates are expected to be unique and increasing but this is not checked;
/// positional operations (rolling mean) follow the stored order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    pub observations: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The value column, in table order.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Earliest and latest date present, if any.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.observations.iter().map(|o| o.date).min()?;
        let last = self.observations.iter().map(|o| o.date).max()?;
        Some((first, last))
    }
}

impl FromIterator<Observation> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn year_month_orders_by_year_then_month() {
        let a = Observation::new(day(2019, 12, 31), 1.0).year_month();
        let b = Observation::new(day(2020, 1, 1), 1.0).year_month();
        assert!(a < b);
        assert_eq!(b.to_string(), "2020-01");
    }

    #[test]
    fn date_span_ignores_storage_order() {
        let table: ObservationTable = [
            Observation::new(day(2020, 3, 1), 1.0),
            Observation::new(day(2020, 1, 1), 2.0),
            Observation::new(day(2020, 2, 1), 3.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.date_span(), Some((day(2020, 1, 1), day(2020, 3, 1))));
        assert_eq!(table.values(), vec![1.0, 2.0, 3.0]);
        assert_eq!(ObservationTable::default().date_span(), None);
    }
}
