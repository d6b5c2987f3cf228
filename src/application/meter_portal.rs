// Port for the utility portal that serves meter readings
use crate::domain::meter::{Installation, Meter, RawReading};
use async_trait::async_trait;

#[async_trait]
pub trait MeterPortal: Send + Sync {
    /// Log in and open a session valid for one fetch-all-meters run
    async fn authenticate(&self) -> anyhow::Result<Box<dyn PortalSession>>;
}

/// An authenticated portal session. Callers must `close` it when done,
/// whether or not the fetch succeeded.
#[async_trait]
pub trait PortalSession: Send {
    /// List installations together with their meters
    async fn list_installations(&mut self) -> anyhow::Result<Vec<Installation>>;

    /// Fetch the raw cumulative readings of one meter
    async fn fetch_readings(&mut self, meter: &Meter) -> anyhow::Result<Vec<RawReading>>;

    async fn close(self: Box<Self>);
}
