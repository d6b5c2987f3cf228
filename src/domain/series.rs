// Derived per-interval energy and power series
use super::error::{MeterError, Result};
use super::meter::RawReading;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;

/// Watt-seconds in one kWh
const WATT_SECONDS_PER_KWH: f64 = 3_600_000.0;

/// Calendar tags of a localized timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarFields {
    pub hour: u32,
    pub day_of_year: u32,
    /// Monday = 0
    pub day_of_week: u32,
    pub day_of_month: u32,
    pub day_name: String,
    pub date: NaiveDate,
    pub time_of_day: NaiveTime,
    /// ISO week number
    pub week: u32,
    pub month: u32,
    pub month_name: String,
}

impl CalendarFields {
    pub fn from_local(time: &DateTime<Tz>) -> Self {
        Self {
            hour: time.hour(),
            day_of_year: time.ordinal(),
            day_of_week: time.weekday().num_days_from_monday(),
            day_of_month: time.day(),
            day_name: time.format("%A").to_string(),
            date: time.date_naive(),
            time_of_day: time.time(),
            week: time.iso_week().week(),
            month: time.month(),
            month_name: time.format("%B").to_string(),
        }
    }

    pub fn is_weekend(&self) -> bool {
        self.day_of_week >= 5
    }

    /// Time of day as fractional hours, used as chart x coordinate
    pub fn hours_of_day(&self) -> f64 {
        f64::from(self.time_of_day.num_seconds_from_midnight()) / 3600.0
    }
}

/// Energy consumed over one interval, ending at `time`
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSample {
    pub time: DateTime<Tz>,
    pub energy_delta_kwh: f64,
    pub time_delta_s: f64,
    pub power_w: f64,
    pub calendar: CalendarFields,
}

impl DerivedSample {
    pub fn new(time: DateTime<Tz>, energy_delta_kwh: f64, time_delta_s: f64) -> Self {
        let calendar = CalendarFields::from_local(&time);
        Self {
            time,
            energy_delta_kwh,
            time_delta_s,
            power_w: energy_delta_kwh * WATT_SECONDS_PER_KWH / time_delta_s,
            calendar,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.calendar.date
    }
}

/// Turn raw cumulative readings into an interval series localized to `tz`.
///
/// The portal appends a placeholder record after the last real reading, so
/// the final raw record is always dropped. Readings are sorted by time; two
/// readings sharing a timestamp are rejected instead of producing an infinite
/// power value. Intervals where either side lacks a cumulative value are
/// skipped.
pub fn derive_series(raw: &[RawReading], tz: Tz) -> Result<Vec<DerivedSample>> {
    let Some((_placeholder, readings)) = raw.split_last() else {
        return Err(MeterError::InsufficientData { usable: 0 });
    };
    if readings.len() < 2 {
        return Err(MeterError::InsufficientData {
            usable: readings.len(),
        });
    }

    let mut readings = readings.to_vec();
    readings.sort_by_key(|r| r.time);

    let mut samples = Vec::with_capacity(readings.len() - 1);
    for pair in readings.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);

        let time_delta_s = (curr.time - prev.time).num_milliseconds() as f64 / 1000.0;
        if time_delta_s <= 0.0 {
            return Err(MeterError::NonMonotonicTime { at: curr.time });
        }

        let (Some(prev_kwh), Some(curr_kwh)) = (
            prev.cumulative_kwh.filter(|v| v.is_finite()),
            curr.cumulative_kwh.filter(|v| v.is_finite()),
        ) else {
            tracing::debug!(
                "Skipping interval ending {} without cumulative value (state {:?})",
                curr.time,
                curr.state
            );
            continue;
        };

        samples.push(DerivedSample::new(
            curr.time.with_timezone(&tz),
            curr_kwh - prev_kwh,
            time_delta_s,
        ));
    }

    Ok(samples)
}
