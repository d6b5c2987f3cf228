// In-memory portal and chat doubles for tests
use crate::application::chat_client::{ChartImage, ChatClient};
use crate::application::meter_portal::{MeterPortal, PortalSession};
use crate::domain::meter::{Installation, Meter, RawReading};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// `count` hourly records starting at `start`, the last one being the
/// placeholder the portal appends
pub fn hourly_readings(start: DateTime<Utc>, count: usize) -> Vec<RawReading> {
    let mut cumulative = 1000.0;
    (0..count)
        .map(|i| {
            let time = start + Duration::hours(i as i64);
            if i + 1 == count {
                return RawReading::new(time, None, "");
            }
            cumulative += 0.2 + 0.1 * (i % 5) as f64;
            RawReading::new(time, Some(cumulative), "Valid")
        })
        .collect()
}

#[derive(Clone, Default)]
pub struct FakePortal {
    installations: Vec<Installation>,
    readings: HashMap<String, std::result::Result<Vec<RawReading>, String>>,
    fail_auth: bool,
    fail_listing: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl FakePortal {
    pub fn new(installations: Vec<Installation>) -> Self {
        Self {
            installations,
            ..Self::default()
        }
    }

    pub fn with_readings(mut self, meter_id: &str, readings: Vec<RawReading>) -> Self {
        self.readings.insert(meter_id.to_string(), Ok(readings));
        self
    }

    pub fn with_failure(mut self, meter_id: &str, message: &str) -> Self {
        self.readings
            .insert(meter_id.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_auth_failure(mut self) -> Self {
        self.fail_auth = true;
        self
    }

    pub fn with_listing_failure(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MeterPortal for FakePortal {
    async fn authenticate(&self) -> anyhow::Result<Box<dyn PortalSession>> {
        if self.fail_auth {
            anyhow::bail!("login rejected");
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            portal: self.clone(),
        }))
    }
}

struct FakeSession {
    portal: FakePortal,
}

#[async_trait]
impl PortalSession for FakeSession {
    async fn list_installations(&mut self) -> anyhow::Result<Vec<Installation>> {
        if self.portal.fail_listing {
            anyhow::bail!("installations unavailable");
        }
        Ok(self.portal.installations.clone())
    }

    async fn fetch_readings(&mut self, meter: &Meter) -> anyhow::Result<Vec<RawReading>> {
        match self.portal.readings.get(&meter.id) {
            Some(Ok(readings)) => Ok(readings.clone()),
            Some(Err(message)) => anyhow::bail!("{message}"),
            None => Ok(Vec::new()),
        }
    }

    async fn close(self: Box<Self>) {
        self.portal.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    Image { chat_id: i64, file_name: String },
}

#[derive(Clone, Default)]
pub struct RecordingChat {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl RecordingChat {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn send_text(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_image(&self, chat_id: i64, image: ChartImage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(Sent::Image {
            chat_id,
            file_name: image.file_name,
        });
        Ok(())
    }
}
