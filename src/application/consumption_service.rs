// Consumption service - Fetch every meter and reduce it to a report
use crate::application::meter_portal::{MeterPortal, PortalSession};
use crate::domain::error::{MeterError, Result};
use crate::domain::meter::{MeterRef, RawReading};
use crate::domain::series::{DerivedSample, derive_series};
use crate::domain::summary::{LastDayStats, Summary, last_day_stats, summarize};
use chrono_tz::Tz;
use std::sync::Arc;

/// Raw readings of one meter, or the reason they could not be fetched
#[derive(Debug, Clone)]
pub struct MeterFetch {
    pub meter: MeterRef,
    pub readings: Result<Vec<RawReading>>,
}

/// Outcome of deriving and aggregating one meter
#[derive(Debug, Clone)]
pub enum MeterReport {
    Complete {
        summary: Summary,
        samples: Vec<DerivedSample>,
    },
    /// All samples fall on one date, so there is no history to project from
    SingleDay {
        meter: MeterRef,
        last_day: LastDayStats,
        samples: Vec<DerivedSample>,
    },
    Failed {
        meter: MeterRef,
        error: MeterError,
    },
}

#[derive(Clone)]
pub struct ConsumptionService {
    portal: Arc<dyn MeterPortal>,
    timezone: Tz,
}

impl ConsumptionService {
    pub fn new(portal: Arc<dyn MeterPortal>, timezone: Tz) -> Self {
        Self { portal, timezone }
    }

    /// Fetch readings for every installation/meter pair inside one portal
    /// session. The session is closed before returning, on success and on
    /// error alike.
    pub async fn fetch_all_meters(&self) -> Result<Vec<MeterFetch>> {
        let mut session = self
            .portal
            .authenticate()
            .await
            .map_err(MeterError::fetch_failed)?;
        tracing::debug!("Portal session opened");

        let result = Self::fetch_with_session(session.as_mut()).await;

        session.close().await;
        tracing::debug!("Portal session closed");

        result
    }

    async fn fetch_with_session(session: &mut dyn PortalSession) -> Result<Vec<MeterFetch>> {
        let installations = session
            .list_installations()
            .await
            .map_err(MeterError::fetch_failed)?;

        let mut fetched = Vec::new();
        for installation in &installations {
            for meter in &installation.meters {
                let meter_ref = MeterRef::new(installation, meter);
                let readings = session
                    .fetch_readings(meter)
                    .await
                    .map_err(MeterError::fetch_failed);

                match &readings {
                    Ok(raw) => tracing::info!(
                        "Fetched {} readings for meter {} of installation {}",
                        raw.len(),
                        meter_ref.meter_id,
                        meter_ref.installation_id
                    ),
                    Err(e) => tracing::warn!(
                        "Fetching meter {} of installation {} failed: {}",
                        meter_ref.meter_id,
                        meter_ref.installation_id,
                        e
                    ),
                }

                fetched.push(MeterFetch {
                    meter: meter_ref,
                    readings,
                });
            }
        }

        Ok(fetched)
    }

    /// Derive and aggregate one fetched meter
    pub fn analyze(&self, fetch: MeterFetch) -> MeterReport {
        let MeterFetch { meter, readings } = fetch;

        let samples = match readings.and_then(|raw| derive_series(&raw, self.timezone)) {
            Ok(samples) => samples,
            Err(error) => return MeterReport::Failed { meter, error },
        };

        match summarize(&samples, meter.clone()) {
            Ok(summary) => MeterReport::Complete { summary, samples },
            Err(MeterError::DivisionByZero) => match last_day_stats(&samples) {
                Some(last_day) => MeterReport::SingleDay {
                    meter,
                    last_day,
                    samples,
                },
                None => MeterReport::Failed {
                    meter,
                    error: MeterError::InsufficientData { usable: 0 },
                },
            },
            Err(error) => MeterReport::Failed { meter, error },
        }
    }
}
