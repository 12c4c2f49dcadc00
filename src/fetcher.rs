//! HTTP fetcher for the router's management endpoints.
//!
//! Each refresh cycle opens a fresh client, walks the endpoint table in
//! order and collects whatever bodies it can get. Endpoint failures are
//! logged and kept as part of the payload set; only a cycle where every
//! endpoint dies at the transport level is reported as a failure.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FetchError, PollError, SetupError};

/// Per-request cap. The router's web server either answers quickly or is
/// wedged; waiting longer only delays the next cycle.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Factory-default LAN address for Arris-family cable modems.
pub const DEFAULT_HOST: &str = "192.168.100.1";

/// Identifies which vendor endpoint a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointId {
    /// Small JSON object with numeric-coded modem state.
    ConnectionTroubleshoot,
    /// One long positional JSON array mixing config and channel data.
    NetworkStatus,
    /// Root HTML page; fallback data plus embedded JS constants.
    RootPage,
}

/// How an endpoint is called and what shape it is expected to answer with.
#[derive(Debug, Clone, Copy)]
pub struct EndpointDescriptor {
    pub id: EndpointId,
    pub path: &'static str,
    pub method: Method,
    /// JSON string sent as the `userData` form field on POST endpoints.
    pub form_payload: Option<&'static str>,
    pub expects: ResponseShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Object,
    /// Positional array; indexing below this length is never attempted.
    Array { min_len: usize },
    Html,
}

/// The discovered vendor endpoints, attempted in this order each cycle.
pub const ENDPOINTS: [EndpointDescriptor; 3] = [
    EndpointDescriptor {
        id: EndpointId::ConnectionTroubleshoot,
        path: "/php/connection_troubleshoot_data.php",
        method: Method::Post,
        form_payload: Some(r#"{"connectionData": ""}"#),
        expects: ResponseShape::Object,
    },
    EndpointDescriptor {
        id: EndpointId::NetworkStatus,
        path: "/php/ajaxGet_device_networkstatus_data.php",
        method: Method::Post,
        form_payload: Some(r#"{"networkStatusData": ""}"#),
        expects: ResponseShape::Array { min_len: 29 },
    },
    EndpointDescriptor {
        id: EndpointId::RootPage,
        path: "/",
        method: Method::Get,
        form_payload: None,
        expects: ResponseShape::Html,
    },
];

/// Raw response body, decoded just far enough for the extractor to probe.
#[derive(Debug, Clone)]
pub enum RawBody {
    Json(Value),
    Html(String),
}

/// One endpoint attempt. Created fresh each cycle and dropped after
/// extraction; never persisted.
#[derive(Debug)]
pub struct RawPayload {
    pub endpoint: EndpointId,
    pub status: Option<u16>,
    pub outcome: Result<RawBody, FetchError>,
}

impl RawPayload {
    pub fn body(&self) -> Option<&RawBody> {
        self.outcome.as_ref().ok()
    }

    fn failed_transport(&self) -> bool {
        matches!(&self.outcome, Err(e) if e.is_transport())
    }
}

fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("ModemViz/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
}

async fn fetch_one(
    client: &reqwest::Client,
    host: &str,
    descriptor: &EndpointDescriptor,
) -> RawPayload {
    let url = format!("http://{}{}", host, descriptor.path);
    let request = match descriptor.method {
        Method::Get => client.get(&url),
        Method::Post => {
            let user_data = descriptor.form_payload.unwrap_or_default();
            client.post(&url).form(&[("userData", user_data)])
        }
    };

    let response = match request.send().await {
        Ok(resp) => resp,
        Err(err) => {
            debug!("{:?} at {} failed: {}", descriptor.id, url, err);
            return RawPayload {
                endpoint: descriptor.id,
                status: None,
                outcome: Err(FetchError::Transport(err)),
            };
        }
    };

    let status = response.status();
    if !status.is_success() {
        debug!("{:?} at {} returned HTTP {}", descriptor.id, url, status);
        return RawPayload {
            endpoint: descriptor.id,
            status: Some(status.as_u16()),
            outcome: Err(FetchError::HttpStatus(status.as_u16())),
        };
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => {
            debug!("{:?} body read failed: {}", descriptor.id, err);
            return RawPayload {
                endpoint: descriptor.id,
                status: Some(status.as_u16()),
                outcome: Err(FetchError::Transport(err)),
            };
        }
    };

    // A JSON endpoint answering non-JSON is firmware drift, not a fetch
    // failure; keep the text so the HTML strategies can still probe it.
    let body = match descriptor.expects {
        ResponseShape::Html => RawBody::Html(text),
        ResponseShape::Object | ResponseShape::Array { .. } => {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => RawBody::Json(value),
                Err(err) => {
                    debug!("{:?} returned unparseable JSON: {}", descriptor.id, err);
                    RawBody::Html(text)
                }
            }
        }
    };

    RawPayload {
        endpoint: descriptor.id,
        status: Some(status.as_u16()),
        outcome: Ok(body),
    }
}

/// Attempts every configured endpoint once, in order, over one
/// cycle-scoped client session.
///
/// # Errors
///
/// Returns [`PollError::AllEndpointsFailed`] only when every endpoint
/// failed at the transport level. Partial results are success.
pub async fn fetch_all(host: &str) -> Result<Vec<RawPayload>, PollError> {
    let client = match build_client() {
        Ok(client) => client,
        Err(err) => {
            warn!("could not build HTTP client: {}", err);
            return Err(PollError::AllEndpointsFailed {
                host: host.to_string(),
                attempts: ENDPOINTS.len(),
            });
        }
    };

    let mut payloads = Vec::with_capacity(ENDPOINTS.len());
    for descriptor in &ENDPOINTS {
        payloads.push(fetch_one(&client, host, descriptor).await);
    }

    if payloads.iter().all(RawPayload::failed_transport) {
        return Err(PollError::AllEndpointsFailed {
            host: host.to_string(),
            attempts: payloads.len(),
        });
    }
    Ok(payloads)
}

/// Setup-time reachability probe, run once before the poll loop starts.
///
/// Any 2xx from the root page is accepted. Content is not strictly
/// validated: a page without the usual modem markers logs a warning so the
/// operator can double-check the address, but setup proceeds.
///
/// # Errors
///
/// [`SetupError::CannotConnect`] for transport failures and HTTP error
/// statuses, [`SetupError::InvalidHost`] for anything else unexpected.
pub async fn probe(host: &str) -> Result<(), SetupError> {
    let client = build_client().map_err(|err| SetupError::InvalidHost {
        host: host.to_string(),
        reason: err.to_string(),
    })?;
    let url = format!("http://{}/", host);

    let response = client.get(&url).send().await.map_err(|err| {
        if err.is_builder() {
            SetupError::InvalidHost {
                host: host.to_string(),
                reason: err.to_string(),
            }
        } else {
            SetupError::CannotConnect {
                host: host.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(SetupError::CannotConnect {
            host: host.to_string(),
        });
    }

    let html = response.text().await.unwrap_or_default();
    let lowered = html.to_lowercase();
    if !lowered.contains("cable modem") && !lowered.contains("docsis") {
        warn!("router page at {} lacks expected modem markers", url);
    }
    Ok(())
}
