// Installation, meter and raw reading domain models
use chrono::{DateTime, Utc};

/// One timestamped cumulative-energy observation as delivered by the portal
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub time: DateTime<Utc>,
    pub cumulative_kwh: Option<f64>,
    pub state: String,
}

impl RawReading {
    pub fn new(
        time: DateTime<Utc>,
        cumulative_kwh: Option<f64>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            time,
            cumulative_kwh,
            state: state.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Meter {
    pub id: String,
    pub short_name: String,
}

impl Meter {
    pub fn new(id: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            short_name: short_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Installation {
    pub id: String,
    pub address: String,
    pub meters: Vec<Meter>,
}

impl Installation {
    pub fn new(id: impl Into<String>, address: impl Into<String>, meters: Vec<Meter>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            meters,
        }
    }
}

/// Identification fields carried alongside every per-meter result
#[derive(Debug, Clone, PartialEq)]
pub struct MeterRef {
    pub installation_id: String,
    pub installation_address: String,
    pub meter_id: String,
    pub meter_short_name: String,
}

impl MeterRef {
    pub fn new(installation: &Installation, meter: &Meter) -> Self {
        Self {
            installation_id: installation.id.clone(),
            installation_address: installation.address.clone(),
            meter_id: meter.id.clone(),
            meter_short_name: meter.short_name.clone(),
        }
    }

    /// Human readable name used in chat messages and chart titles
    pub fn label(&self) -> String {
        let address = self.installation_address.trim();
        if address.is_empty() {
            self.installation_id.clone()
        } else {
            format!("{} ({})", self.installation_id, address)
        }
    }

    /// File-name safe stem for chart attachments
    pub fn file_stem(&self) -> String {
        let source = if self.meter_short_name.is_empty() {
            &self.meter_id
        } else {
            &self.meter_short_name
        };
        source
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    }
}
