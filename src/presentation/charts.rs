// SVG charts of a meter's derived series
use crate::domain::meter::MeterRef;
use crate::domain::series::{CalendarFields, DerivedSample};
use chrono::NaiveDate;
use plotters::prelude::*;
use std::collections::BTreeMap;

const ACCENT: RGBColor = RGBColor(33, 150, 243);
const NEUTRAL: RGBColor = RGBColor(158, 158, 158);
const MAX_BAR_LABELS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    pub fn of(calendar: &CalendarFields) -> Self {
        if calendar.is_weekend() {
            DayKind::Weekend
        } else {
            DayKind::Weekday
        }
    }

    pub fn color(self) -> RGBColor {
        match self {
            DayKind::Weekday => ACCENT,
            DayKind::Weekend => NEUTRAL,
        }
    }
}

/// One bar of the daily energy chart
#[derive(Debug, Clone, PartialEq)]
pub struct DailyEnergy {
    pub date: NaiveDate,
    pub energy_kwh: f64,
    pub kind: DayKind,
}

/// Energy per calendar date, oldest first
pub fn daily_energy(samples: &[DerivedSample]) -> Vec<DailyEnergy> {
    let mut totals: BTreeMap<NaiveDate, DailyEnergy> = BTreeMap::new();
    for sample in samples {
        totals
            .entry(sample.date())
            .or_insert_with(|| DailyEnergy {
                date: sample.date(),
                energy_kwh: 0.0,
                kind: DayKind::of(&sample.calendar),
            })
            .energy_kwh += sample.energy_delta_kwh;
    }

    totals.into_values().collect()
}

/// Y axis bounds including zero, padded by 10%
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = max - min;
    if span <= 0.0 {
        return (min, min + 1.0);
    }
    let lower = if min < 0.0 { min - span * 0.1 } else { min };
    (lower, max + span * 0.1)
}

fn format_hours(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn day_profile(samples: &[DerivedSample], date: NaiveDate) -> Vec<(f64, f64)> {
    samples
        .iter()
        .filter(|s| s.date() == date)
        .map(|s| (s.calendar.hours_of_day(), s.power_w))
        .collect()
}

/// Power over the calendar date of the final sample, line with markers
pub fn power_last_day_svg(
    meter: &MeterRef,
    samples: &[DerivedSample],
    width: u32,
    height: u32,
) -> anyhow::Result<String> {
    let Some(last) = samples.last() else {
        anyhow::bail!("no samples to chart for meter {}", meter.meter_id);
    };
    let date = last.date();
    let points = day_profile(samples, date);
    let (y_min, y_max) = value_range(points.iter().map(|p| p.1));
    let caption = format!("Last day's power consumption ({}) - {}", date, meter.label());
    let x_desc = format!("Time of day on {}", date);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&caption, ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..24.0, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc(x_desc.as_str())
            .y_desc("Power [W]")
            .x_labels(13)
            .x_label_formatter(&|h| format_hours(*h))
            .draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), ACCENT.stroke_width(2)))?;
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, ACCENT.filled())),
        )?;

        root.present()?;
    }

    Ok(svg)
}

/// One power line per date over time of day; the latest date drawn thick
/// in the accent color on top of thin neutral history lines
pub fn power_history_svg(
    meter: &MeterRef,
    samples: &[DerivedSample],
    width: u32,
    height: u32,
) -> anyhow::Result<String> {
    let mut days: BTreeMap<NaiveDate, Vec<(f64, f64)>> = BTreeMap::new();
    for sample in samples {
        days.entry(sample.date())
            .or_default()
            .push((sample.calendar.hours_of_day(), sample.power_w));
    }
    let Some(latest) = days.keys().next_back().copied() else {
        anyhow::bail!("no samples to chart for meter {}", meter.meter_id);
    };
    let (y_min, y_max) = value_range(samples.iter().map(|s| s.power_w));
    let caption = format!("Power consumption over day (with history) - {}", meter.label());

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&caption, ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..24.0, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Time of day")
            .y_desc("Power [W]")
            .x_labels(13)
            .x_label_formatter(&|h| format_hours(*h))
            .draw()?;

        for (date, points) in &days {
            if *date != latest {
                chart.draw_series(LineSeries::new(
                    points.iter().copied(),
                    NEUTRAL.stroke_width(1),
                ))?;
            }
        }
        if let Some(points) = days.get(&latest) {
            chart.draw_series(LineSeries::new(points.iter().copied(), ACCENT.stroke_width(4)))?;
        }

        root.present()?;
    }

    Ok(svg)
}

/// Daily energy bars, weekdays accent and weekends neutral
pub fn daily_energy_svg(
    meter: &MeterRef,
    samples: &[DerivedSample],
    width: u32,
    height: u32,
) -> anyhow::Result<String> {
    let bars = daily_energy(samples);
    if bars.is_empty() {
        anyhow::bail!("no samples to chart for meter {}", meter.meter_id);
    }
    let (y_min, y_max) = value_range(bars.iter().map(|b| b.energy_kwh));
    let x_max = bars.len() as f64 - 0.5;
    let caption = format!("Daily energy consumption - {}", meter.label());

    let bar_label = |x: &f64| {
        let index = x.round();
        if (x - index).abs() > 0.01 || index < 0.0 {
            return String::new();
        }
        bars.get(index as usize)
            .map(|b| b.date.format("%a %d.%m").to_string())
            .unwrap_or_default()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&caption, ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc("Energy [kWh]")
            .x_labels(bars.len().min(MAX_BAR_LABELS))
            .x_label_formatter(&bar_label)
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let x = i as f64;
            Rectangle::new(
                [(x - 0.4, 0.0), (x + 0.4, bar.energy_kwh)],
                bar.kind.color().filled(),
            )
        }))?;

        root.present()?;
    }

    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meter::{Installation, Meter, RawReading};
    use crate::domain::series::derive_series;
    use chrono::{Duration, TimeZone, Utc};

    fn meter() -> MeterRef {
        MeterRef::new(
            &Installation::new("4711", "Herrengasse 1", vec![]),
            &Meter::new("99", "AT0001"),
        )
    }

    /// Monday 2024-03-04 through Sunday 2024-03-10, one sample per day,
    /// weekend days consuming noticeably more
    fn one_week() -> Vec<DerivedSample> {
        let start = Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap();
        let deltas = [4.0, 4.5, 5.0, 4.25, 4.75, 9.0, 11.0];
        let mut cumulative = 100.0;
        let mut raw = vec![RawReading::new(start, Some(cumulative), "Valid")];
        for (i, delta) in deltas.iter().enumerate() {
            cumulative += delta;
            raw.push(RawReading::new(
                start + Duration::days(i as i64 + 1),
                Some(cumulative),
                "Valid",
            ));
        }
        raw.push(RawReading::new(start + Duration::days(8), None, ""));
        derive_series(&raw, chrono_tz::UTC).unwrap()
    }

    #[test]
    fn test_weekend_bars_marked() {
        let bars = daily_energy(&one_week());

        assert_eq!(bars.len(), 7);
        let weekend: Vec<NaiveDate> = bars
            .iter()
            .filter(|b| b.kind == DayKind::Weekend)
            .map(|b| b.date)
            .collect();
        assert_eq!(
            weekend,
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            ]
        );
        for bar in &bars {
            let expected = if bar.kind == DayKind::Weekend { NEUTRAL } else { ACCENT };
            assert_eq!(bar.kind.color(), expected);
        }
        assert_eq!(bars[5].energy_kwh, 9.0);
        assert_eq!(bars[6].energy_kwh, 11.0);
    }

    #[test]
    fn test_weekend_follows_local_date() {
        // Friday 23:00 UTC is already Saturday in Vienna
        let start = Utc.with_ymd_and_hms(2024, 3, 8, 22, 0, 0).unwrap();
        let raw = vec![
            RawReading::new(start, Some(1.0), "Valid"),
            RawReading::new(start + Duration::hours(1), Some(1.5), "Valid"),
            RawReading::new(start + Duration::hours(2), None, ""),
        ];
        let samples = derive_series(&raw, chrono_tz::Europe::Vienna).unwrap();

        let bars = daily_energy(&samples);

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(bars[0].kind, DayKind::Weekend);
    }

    #[test]
    fn test_daily_energy_sums_per_date() {
        let start = Utc.with_ymd_and_hms(2024, 3, 6, 20, 0, 0).unwrap();
        let raw: Vec<RawReading> = (0..8)
            .map(|i| {
                let value = if i == 7 { None } else { Some(i as f64) };
                RawReading::new(start + Duration::hours(i), value, "Valid")
            })
            .collect();
        let samples = derive_series(&raw, chrono_tz::UTC).unwrap();

        let bars = daily_energy(&samples);

        // 21:00..=23:00 on the 6th, 00:00..=02:00 on the 7th
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].energy_kwh, 3.0);
        assert_eq!(bars[1].energy_kwh, 3.0);
    }

    #[test]
    fn test_value_range() {
        let (lo, hi) = value_range([0.0, 100.0].into_iter());
        assert_eq!(lo, 0.0);
        assert!((hi - 110.0).abs() < 1e-9);
        assert_eq!(value_range(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = value_range([-10.0, 90.0].into_iter());
        assert!(lo < -10.0 && hi > 90.0);
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(0.0), "00:00");
        assert_eq!(format_hours(13.75), "13:45");
    }

    #[test]
    fn test_render_charts() {
        let samples = one_week();

        let svg = power_last_day_svg(&meter(), &samples, 800, 400).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Time of day on 2024-03-10"));

        let svg = power_history_svg(&meter(), &samples, 800, 400).unwrap();
        assert!(svg.contains("<svg"));

        let svg = daily_energy_svg(&meter(), &samples, 800, 400).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_empty_series_not_rendered() {
        assert!(power_last_day_svg(&meter(), &[], 800, 400).is_err());
        assert!(power_history_svg(&meter(), &[], 800, 400).is_err());
        assert!(daily_energy_svg(&meter(), &[], 800, 400).is_err());
    }
}
