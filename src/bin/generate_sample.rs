use std::f64::consts::PI;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Days, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

/// Expected page views on day `t` (days since the start): linear growth,
/// a weekday/weekend cycle and a yearly cycle peaking in late autumn.
fn expected_views(date: NaiveDate, t: f64) -> f64 {
    let trend = 20_000.0 + 45.0 * t;
    let weekly = match date.weekday().num_days_from_monday() {
        5 | 6 => 0.82,
        _ => 1.05,
    };
    let yearly = 1.0 + 0.18 * (2.0 * PI * (f64::from(date.ordinal()) - 240.0) / 365.25).sin();
    trend * weekly * yearly
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // 2016-05-09 → 2019-12-03, one row per day
    let start = NaiveDate::from_ymd_opt(2016, 5, 9).context("invalid start date")?;
    let n_days: u64 = 1304;

    let mut dates: Vec<NaiveDate> = Vec::with_capacity(n_days as usize);
    let mut views: Vec<i64> = Vec::with_capacity(n_days as usize);

    for i in 0..n_days {
        let date = start + Days::new(i);
        let base = expected_views(date, i as f64);
        let mut value = rng.gauss(base, base * 0.08);

        // Occasional traffic spikes (shared links) and outages.
        let roll = rng.next_f64();
        if roll < 0.01 {
            value *= 4.0 + 6.0 * rng.next_f64();
        } else if roll < 0.015 {
            value *= 0.05;
        }

        dates.push(date);
        views.push(value.max(0.0).round() as i64);
    }

    // Write CSV
    let csv_path = "page_views.csv";
    let mut writer = csv::Writer::from_path(csv_path).context("creating CSV file")?;
    writer.write_record(["date", "value"])?;
    for (date, value) in dates.iter().zip(&views) {
        writer.write_record([date.format("%Y-%m-%d").to_string(), value.to_string()])?;
    }
    writer.flush().context("flushing CSV file")?;

    // Build Arrow arrays
    let epoch = NaiveDate::default();
    let day_numbers: Vec<i32> = dates
        .iter()
        .map(|d| d.signed_duration_since(epoch).num_days() as i32)
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("value", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(day_numbers)),
            Arc::new(Int64Array::from(views)),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let parquet_path = "page_views.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {n_days} daily observations ({} .. {}) to {csv_path} and {parquet_path}",
        dates[0],
        dates[dates.len() - 1]
    );
    Ok(())
}
