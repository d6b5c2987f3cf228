// Stromnetz Graz web portal client
use crate::application::meter_portal::{MeterPortal, PortalSession};
use crate::domain::meter::{Installation, Meter, RawReading};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Reading type carrying the cumulative meter register value
const METER_READING_TYPE: &str = "MR";

#[derive(Debug, Clone)]
pub struct StromNetzPortal {
    client: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
    history_days: i64,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Portal ids arrive as numbers or strings depending on the endpoint
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortalId {
    Number(i64),
    Text(String),
}

impl PortalId {
    fn into_string(self) -> String {
        match self {
            PortalId::Number(n) => n.to_string(),
            PortalId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstallationDto {
    #[serde(rename = "installationID")]
    installation_id: PortalId,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    meter_points: Vec<MeterPointDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeterPointDto {
    #[serde(rename = "meterPointID")]
    meter_point_id: PortalId,
    #[serde(default)]
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeterReadingResponse {
    #[serde(default)]
    readings: Vec<ReadingDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingDto {
    read_time: DateTime<Utc>,
    #[serde(default)]
    reading_values: Vec<ReadingValueDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadingValueDto {
    #[serde(default)]
    reading_value: Option<f64>,
    #[serde(default)]
    reading_type: String,
    #[serde(default)]
    reading_state: String,
}

impl From<InstallationDto> for Installation {
    fn from(dto: InstallationDto) -> Self {
        let meters = dto
            .meter_points
            .into_iter()
            .map(|mp| {
                Meter::new(
                    mp.meter_point_id.into_string(),
                    mp.short_name.unwrap_or_default(),
                )
            })
            .collect();
        Installation::new(
            dto.installation_id.into_string(),
            dto.address.unwrap_or_default(),
            meters,
        )
    }
}

impl From<ReadingDto> for RawReading {
    fn from(dto: ReadingDto) -> Self {
        let cumulative_kwh = dto
            .reading_values
            .iter()
            .find(|v| v.reading_type == METER_READING_TYPE)
            .and_then(|v| v.reading_value);
        let state = dto
            .reading_values
            .first()
            .map(|v| v.reading_state.clone())
            .unwrap_or_default();
        RawReading::new(dto.read_time, cumulative_kwh, state)
    }
}

impl StromNetzPortal {
    pub fn new(base_url: String, email: String, password: String, history_days: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            password,
            history_days,
        }
    }
}

#[async_trait]
impl MeterPortal for StromNetzPortal {
    async fn authenticate(&self) -> Result<Box<dyn PortalSession>> {
        let url = format!("{}/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "email": self.email, "password": self.password }))
            .send()
            .await
            .context("Failed to send login request to portal")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Portal login rejected with status {}", status);
        }

        let login = response
            .json::<LoginResponse>()
            .await
            .context("Failed to parse portal login response")?;

        Ok(Box::new(StromNetzSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: login.token,
            history_days: self.history_days,
        }))
    }
}

pub struct StromNetzSession {
    client: reqwest::Client,
    base_url: String,
    token: String,
    history_days: i64,
}

impl StromNetzSession {
    async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to portal", endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Portal {} failed with status {}: {}", endpoint, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse portal {} response", endpoint))
    }
}

/// Numeric meter ids are sent back as numbers, anything else verbatim
fn meter_point_id(meter: &Meter) -> Value {
    meter
        .id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(meter.id.clone()))
}

#[async_trait]
impl PortalSession for StromNetzSession {
    async fn list_installations(&mut self) -> Result<Vec<Installation>> {
        let installations: Vec<InstallationDto> =
            self.post("getInstallations", &json!({})).await?;
        Ok(installations.into_iter().map(Installation::from).collect())
    }

    async fn fetch_readings(&mut self, meter: &Meter) -> Result<Vec<RawReading>> {
        let to = Utc::now();
        let from = to - Duration::days(self.history_days);
        let body = json!({
            "meterPointId": meter_point_id(meter),
            "fromDate": from.to_rfc3339_opts(SecondsFormat::Millis, true),
            "toDate": to.to_rfc3339_opts(SecondsFormat::Millis, true),
            "interval": "QuarterHourly",
            "unitOfConsump": "KWH",
        });

        tracing::debug!("Requesting readings for meter {} since {}", meter.id, from);
        let response: MeterReadingResponse = self.post("getMeterReading", &body).await?;

        Ok(response.readings.into_iter().map(RawReading::from).collect())
    }

    async fn close(self: Box<Self>) {
        // The portal keeps no server-side session; dropping the token ends it
        tracing::debug!("Discarding portal token for {}", self.base_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};

    fn portal(url: String) -> StromNetzPortal {
        StromNetzPortal::new(url, "user@example.com".to_string(), "secret".to_string(), 30)
    }

    #[tokio::test]
    async fn test_login_and_list_installations() {
        let mut server = Server::new_async().await;
        let login = server
            .mock("POST", "/login")
            .match_body(Matcher::PartialJson(json!({ "email": "user@example.com" })))
            .with_status(200)
            .with_body(json!({ "token": "tok" }).to_string())
            .create_async()
            .await;
        let installations = server
            .mock("POST", "/getInstallations")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(
                json!([{
                    "installationID": 4711,
                    "address": "Herrengasse 1, 8010 Graz",
                    "meterPoints": [
                        { "meterPointID": 99, "shortName": "AT0001" },
                        { "meterPointID": "AT-2" }
                    ]
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let mut session = portal(server.url()).authenticate().await.unwrap();
        let result = session.list_installations().await.unwrap();
        session.close().await;

        assert_eq!(
            result,
            vec![Installation::new(
                "4711",
                "Herrengasse 1, 8010 Graz",
                vec![Meter::new("99", "AT0001"), Meter::new("AT-2", "")],
            )]
        );
        login.assert_async().await;
        installations.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/login")
            .with_status(401)
            .create_async()
            .await;

        let err = portal(server.url()).authenticate().await.err().unwrap();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_fetch_readings() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/login")
            .with_status(200)
            .with_body(json!({ "token": "tok" }).to_string())
            .create_async()
            .await;
        let readings = server
            .mock("POST", "/getMeterReading")
            .match_body(Matcher::PartialJson(json!({
                "meterPointId": 99,
                "interval": "QuarterHourly"
            })))
            .with_status(200)
            .with_body(
                json!({
                    "readings": [
                        {
                            "readTime": "2024-03-06T10:00:00Z",
                            "readingValues": [
                                { "readingValue": 0.25, "readingType": "CONSUMP", "readingState": "Valid" },
                                { "readingValue": 1500.5, "readingType": "MR", "readingState": "Valid" }
                            ]
                        },
                        {
                            "readTime": "2024-03-06T10:15:00Z",
                            "readingValues": [
                                { "readingValue": null, "readingType": "MR", "readingState": "Missing" }
                            ]
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mut session = portal(server.url()).authenticate().await.unwrap();
        let result = session
            .fetch_readings(&Meter::new("99", "AT0001"))
            .await
            .unwrap();

        let first = Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap();
        assert_eq!(
            result,
            vec![
                RawReading::new(first, Some(1500.5), "Valid"),
                RawReading::new(first + Duration::minutes(15), None, "Missing"),
            ]
        );
        readings.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_readings_server_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/login")
            .with_status(200)
            .with_body(json!({ "token": "tok" }).to_string())
            .create_async()
            .await;
        server
            .mock("POST", "/getMeterReading")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let mut session = portal(server.url()).authenticate().await.unwrap();
        let err = session
            .fetch_readings(&Meter::new("99", "AT0001"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("500"));
    }
}
