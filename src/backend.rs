//! HTTP client for the SOS service.
//!
//! Requests go through the `curl` executable, one process per call.
//! Endpoints:
//!
//! - `POST /sos/` — open an event
//! - `GET /sos/{id}` — current record of an event
//! - `GET /hospitals/nearby?lat=..&lon=..` — nearby facilities

use async_trait::async_trait;
use jiff::{Timestamp, civil, tz::TimeZone};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SosError};
use crate::model::{Ambulance, Hospital, NewSosEvent, SosEvent, SosStatus};
use crate::ports::SosBackend;

/// The SOS service at a base URL such as `http://localhost:8000`.
pub struct HttpBackend {
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn event_url(&self, id: u64) -> String {
        format!("{}/sos/{id}", self.base_url)
    }

    fn hospitals_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/hospitals/nearby?lat={latitude}&lon={longitude}",
            self.base_url
        )
    }
}

#[async_trait]
impl SosBackend for HttpBackend {
    async fn create_event(&self, event: &NewSosEvent) -> Result<SosEvent> {
        let url = format!("{}/sos/", self.base_url);
        let body = serde_json::to_string(event)
            .map_err(|e| SosError::Backend(format!("failed to encode SOS: {e}")))?;
        let response = curl(&[
            "-X",
            "POST",
            "-H",
            "Content-Type: application/json",
            "--data",
            &body,
            &url,
        ])
        .await?;
        parse_event(&response)
    }

    async fn event_status(&self, id: u64) -> Result<SosEvent> {
        let response = curl(&[&self.event_url(id)]).await?;
        parse_event(&response)
    }

    async fn nearby_hospitals(&self, latitude: f64, longitude: f64) -> Result<Vec<Hospital>> {
        let response = curl(&[&self.hospitals_url(latitude, longitude)]).await?;
        parse_hospitals(&response)
    }
}

/// Run curl and return the response body on a 2xx status.
async fn curl(args: &[&str]) -> Result<String> {
    debug!(?args, "curl");
    let output = Command::new("curl")
        .args(["--silent", "--show-error", "--fail"])
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| SosError::Backend(format!("failed to run curl: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SosError::Backend(stderr.trim().to_string()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// An event as the service serializes it.
#[derive(Deserialize)]
struct WireEvent {
    id: u64,
    user_id: String,
    latitude: f64,
    longitude: f64,
    emergency_type: String,
    status: SosStatus,
    timestamp: Option<String>,
    assigned_ambulance_id: Option<String>,
    ambulance_lat: Option<f64>,
    ambulance_lon: Option<f64>,
}

#[derive(Deserialize)]
struct WireHospital {
    id: u64,
    name: String,
    lat: f64,
    lon: f64,
    distance_km: f64,
}

fn parse_event(json: &str) -> Result<SosEvent> {
    let wire: WireEvent = serde_json::from_str(json)
        .map_err(|e| SosError::Backend(format!("unexpected SOS response: {e}")))?;

    let ambulance = wire.assigned_ambulance_id.map(|id| Ambulance {
        id,
        latitude: wire.ambulance_lat,
        longitude: wire.ambulance_lon,
    });

    Ok(SosEvent {
        id: wire.id,
        user_id: wire.user_id,
        latitude: wire.latitude,
        longitude: wire.longitude,
        emergency_type: wire.emergency_type,
        status: wire.status,
        timestamp: wire.timestamp.as_deref().and_then(parse_timestamp),
        ambulance,
    })
}

fn parse_hospitals(json: &str) -> Result<Vec<Hospital>> {
    let wire: Vec<WireHospital> = serde_json::from_str(json)
        .map_err(|e| SosError::Backend(format!("unexpected hospitals response: {e}")))?;

    Ok(wire
        .into_iter()
        .map(|h| Hospital {
            id: h.id,
            name: h.name,
            latitude: h.lat,
            longitude: h.lon,
            distance_km: h.distance_km,
        })
        .collect())
}

/// Parse a service timestamp. Ones without an offset are UTC.
fn parse_timestamp(s: &str) -> Option<Timestamp> {
    if let Ok(ts) = s.parse::<Timestamp>() {
        return Some(ts);
    }
    let datetime = s.parse::<civil::DateTime>().ok()?;
    datetime
        .to_zoned(TimeZone::UTC)
        .ok()
        .map(|zoned| zoned.timestamp())
}
