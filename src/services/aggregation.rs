//! Reduces raw samples into daily or monthly buckets.
//!
//! Buckets are keyed by the UTC calendar date (or year-month) of each sample. Only buckets that
//! hold at least one sample are emitted, in ascending order.

use crate::models::series::{AggregatedDataPoint, AggregationType, Reduction, Sample};
use crate::services::completeness::{daily_completeness, monthly_completeness};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Identity of the series being reduced, copied onto every bucket.
#[derive(Debug, Copy, Clone)]
pub struct SeriesRef<'a> {
    pub well_id: &'a str,
    pub metric_name: &'a str,
    pub unit: &'a str,
}

#[derive(Debug, Copy, Clone)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Accumulator {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn reduce(&self, reduction: Reduction) -> f64 {
        match reduction {
            Reduction::Average => self.sum / self.count as f64,
            Reduction::Max => self.max,
            Reduction::Min => self.min,
            Reduction::Sum => self.sum,
        }
    }
}

fn bucket_samples<F>(samples: &[Sample], start_date: NaiveDate, end_date: NaiveDate, key: F) -> BTreeMap<NaiveDate, Accumulator>
where
    F: Fn(NaiveDate) -> NaiveDate,
{
    let mut buckets = BTreeMap::new();
    for sample in samples {
        let day = sample.timestamp.date_naive();
        if day < start_date || day > end_date {
            continue;
        }
        buckets
            .entry(key(day))
            .or_insert_with(Accumulator::new)
            .push(sample.value);
    }
    buckets
}

pub fn compute_daily_aggregation(
    series: SeriesRef<'_>,
    samples: &[Sample],
    start_date: NaiveDate,
    end_date: NaiveDate,
    reduction: Reduction,
) -> Vec<AggregatedDataPoint> {
    let aggregation_type = AggregationType::daily(reduction);
    bucket_samples(samples, start_date, end_date, |day| day)
        .into_iter()
        .map(|(day, acc)| AggregatedDataPoint {
            date: day,
            time_period: day.format("%Y-%m-%d").to_string(),
            well_id: series.well_id.to_string(),
            metric_name: series.metric_name.to_string(),
            aggregated_value: acc.reduce(reduction),
            aggregation_type,
            unit: series.unit.to_string(),
            data_point_count: acc.count,
            min_value: acc.min,
            max_value: acc.max,
            data_completeness: daily_completeness(acc.count),
        })
        .collect()
}

pub fn compute_monthly_average(
    series: SeriesRef<'_>,
    samples: &[Sample],
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<AggregatedDataPoint> {
    bucket_samples(samples, start_date, end_date, |day| day.with_day(1).unwrap_or(day))
        .into_iter()
        .map(|(month, acc)| AggregatedDataPoint {
            date: month,
            time_period: month.format("%Y-%m").to_string(),
            well_id: series.well_id.to_string(),
            metric_name: series.metric_name.to_string(),
            aggregated_value: acc.reduce(Reduction::Average),
            aggregation_type: AggregationType::MonthlyAverage,
            unit: series.unit.to_string(),
            data_point_count: acc.count,
            min_value: acc.min,
            max_value: acc.max,
            data_completeness: monthly_completeness(month, acc.count),
        })
        .collect()
}

/// Dispatches on the requested aggregation type.
pub fn aggregate(
    series: SeriesRef<'_>,
    samples: &[Sample],
    start_date: NaiveDate,
    end_date: NaiveDate,
    aggregation_type: AggregationType,
) -> Vec<AggregatedDataPoint> {
    let reduction = match aggregation_type {
        AggregationType::DailyAverage => Reduction::Average,
        AggregationType::DailyMax => Reduction::Max,
        AggregationType::DailyMin => Reduction::Min,
        AggregationType::DailySum => Reduction::Sum,
        AggregationType::MonthlyAverage => {
            return compute_monthly_average(series, samples, start_date, end_date);
        }
    };
    compute_daily_aggregation(series, samples, start_date, end_date, reduction)
}
