// Per-meter consumption summary
use super::error::{MeterError, Result};
use super::meter::MeterRef;
use super::series::DerivedSample;
use chrono::{Duration, NaiveDate};

pub const DAYS_PER_YEAR: f64 = 365.0;

/// Days covered by the "last week" window, including the last day
pub const LAST_WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct LastDayStats {
    pub date: NaiveDate,
    pub consumption_kwh: f64,
    pub min_power_w: f64,
    pub max_power_w: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnualProjections {
    pub last_day_kwh_per_year: f64,
    pub last_week_kwh_per_year: f64,
    pub all_data_kwh_per_year: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub meter: MeterRef,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub number_of_days: i64,
    pub total_consumption_kwh: f64,
    pub last_day_consumption_kwh: f64,
    pub last_week_consumption_kwh: f64,
    pub min_power_last_day_w: f64,
    pub max_power_last_day_w: f64,
    pub projections: AnnualProjections,
}

/// Consumption and power extremes on the calendar date of the final sample
pub fn last_day_stats(samples: &[DerivedSample]) -> Option<LastDayStats> {
    let date = samples.last()?.date();
    let last_day = samples.iter().filter(|s| s.date() == date);

    let mut stats = LastDayStats {
        date,
        consumption_kwh: 0.0,
        min_power_w: f64::INFINITY,
        max_power_w: f64::NEG_INFINITY,
    };
    for sample in last_day {
        stats.consumption_kwh += sample.energy_delta_kwh;
        stats.min_power_w = stats.min_power_w.min(sample.power_w);
        stats.max_power_w = stats.max_power_w.max(sample.power_w);
    }

    Some(stats)
}

/// Sum of energy deltas from `last_date - 6 days` through `last_date`
pub fn last_week_consumption(samples: &[DerivedSample], last_date: NaiveDate) -> f64 {
    let window_start = last_date - Duration::days(LAST_WEEK_DAYS - 1);
    samples
        .iter()
        .filter(|s| s.date() >= window_start)
        .map(|s| s.energy_delta_kwh)
        .sum()
}

/// Scale the whole history to a 365 day estimate
pub fn annualize_all_data(total_kwh: f64, number_of_days: i64) -> Result<f64> {
    if number_of_days == 0 {
        return Err(MeterError::DivisionByZero);
    }
    Ok(total_kwh / number_of_days as f64 * DAYS_PER_YEAR)
}

/// Reduce a derived series into the fixed per-meter summary.
///
/// Fails with `DivisionByZero` when every sample falls on the same calendar
/// date, since the all-data projection is then undefined.
pub fn summarize(samples: &[DerivedSample], meter: MeterRef) -> Result<Summary> {
    let (Some(first), Some(last_day)) = (samples.first(), last_day_stats(samples)) else {
        return Err(MeterError::InsufficientData { usable: 0 });
    };

    let first_date = first.date();
    let last_date = last_day.date;
    let number_of_days = (last_date - first_date).num_days();

    let total_consumption_kwh: f64 = samples.iter().map(|s| s.energy_delta_kwh).sum();
    let last_week_consumption_kwh = last_week_consumption(samples, last_date);

    let projections = AnnualProjections {
        last_day_kwh_per_year: last_day.consumption_kwh * DAYS_PER_YEAR,
        last_week_kwh_per_year: last_week_consumption_kwh / LAST_WEEK_DAYS as f64 * DAYS_PER_YEAR,
        all_data_kwh_per_year: annualize_all_data(total_consumption_kwh, number_of_days)?,
    };

    Ok(Summary {
        meter,
        first_date,
        last_date,
        number_of_days,
        total_consumption_kwh,
        last_day_consumption_kwh: last_day.consumption_kwh,
        last_week_consumption_kwh,
        min_power_last_day_w: last_day.min_power_w,
        max_power_last_day_w: last_day.max_power_w,
        projections,
    })
}
