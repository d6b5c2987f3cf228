// Chat texts sent back to the requester
use crate::domain::error::MeterError;
use crate::domain::meter::MeterRef;
use crate::domain::summary::{LastDayStats, Summary};

pub const CONNECTING: &str = "trying to connect to the Stromnetz Graz portal...";
pub const NO_METERS: &str = "no meters found for this account";

fn meter_heading(meter: &MeterRef) -> String {
    let name = if meter.meter_short_name.is_empty() {
        &meter.meter_id
    } else {
        &meter.meter_short_name
    };
    format!("installation id:{}, meter {}", meter.label(), name)
}

pub fn summary_text(summary: &Summary) -> String {
    let p = &summary.projections;
    format!(
        "{}: {} days ({} to {})\n > {:.0}kWh/Year (last day)\n > {:.0}kWh/Year (last week)\n > {:.0}kWh/Year (last {} days)",
        meter_heading(&summary.meter),
        summary.number_of_days,
        summary.first_date,
        summary.last_date,
        p.last_day_kwh_per_year,
        p.last_week_kwh_per_year,
        p.all_data_kwh_per_year,
        summary.number_of_days,
    )
}

/// Only one calendar date of data: report the day itself, no projection
pub fn single_day_text(meter: &MeterRef, stats: &LastDayStats) -> String {
    format!(
        "{}: only {} available, annual projection unavailable\n > {:.2}kWh consumed\n > power {:.0}W to {:.0}W",
        meter_heading(meter),
        stats.date,
        stats.consumption_kwh,
        stats.min_power_w,
        stats.max_power_w,
    )
}

pub fn failure_text(meter: &MeterRef, error: &MeterError) -> String {
    format!("{}: skipped, {}", meter_heading(meter), error)
}

pub fn fetch_failed_text(error: &MeterError) -> String {
    format!("could not load meter data: {}", error)
}

pub fn chart_failed_text(file_name: &str) -> String {
    format!("could not render chart {}", file_name)
}

pub fn unauthorized_warning(chat_id: i64) -> String {
    format!(
        "WARNING: /get_consumption command from unauthorized chat (chat_id={})",
        chat_id
    )
}
