use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, HOST};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// ─── Error taxonomy ──────────────────────────────────────────────

/// Why a request produced no response. Unexpected status codes are not
/// errors at this layer; they arrive as a normal [`ProbeResponse`] and
/// are judged by the caller.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,
    #[error("cannot connect: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

// ─── Outcome types ───────────────────────────────────────────────

/// A response that arrived, whatever its status.
#[derive(Debug)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ProbeResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Result of one timed HTTP call. The elapsed time is always present,
/// so every attempt can be recorded as a sample even when it failed.
#[derive(Debug)]
pub struct Outcome {
    pub elapsed: Duration,
    pub result: Result<ProbeResponse, ProbeError>,
}

impl Outcome {
    /// Status code if a response arrived, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        self.result.as_ref().ok().map(|r| r.status)
    }

    pub fn is_status(&self, code: u16) -> bool {
        self.status() == Some(code)
    }
}

// ─── Probe client ────────────────────────────────────────────────

/// Thin wrapper over one shared `reqwest::Client`. All scenario and
/// connectivity traffic flows through here so timing and error mapping
/// stay uniform.
pub struct ProbeClient {
    client: reqwest::Client,
}

impl ProbeClient {
    pub fn new() -> anyhow::Result<Self> {
        // No client-level timeout: each call carries its own bound.
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// GET `url`, optionally with a `Host` header naming the backend
    /// (how the proxy learns where to forward).
    pub async fn get(&self, url: &str, host: Option<&str>, timeout: Duration) -> Outcome {
        let mut req = self.client.get(url).timeout(timeout);
        if let Some(host) = host {
            if let Ok(value) = HeaderValue::from_str(host) {
                req = req.header(HOST, value);
            }
        }
        Self::execute(req).await
    }

    pub async fn post_json<T: Serialize>(
        &self,
        url: &str,
        body: &T,
        timeout: Duration,
    ) -> Outcome {
        Self::execute(self.client.post(url).json(body).timeout(timeout)).await
    }

    pub async fn delete(&self, url: &str, timeout: Duration) -> Outcome {
        Self::execute(self.client.delete(url).timeout(timeout)).await
    }

    /// Run the request and time it end to end, body download included:
    /// for the large-object fetch the transfer is the measurement.
    async fn execute(req: reqwest::RequestBuilder) -> Outcome {
        let start = Instant::now();

        let result = match req.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(body) => Ok(ProbeResponse {
                        status,
                        body: body.to_vec(),
                    }),
                    Err(err) => Err(ProbeError::from(err)),
                }
            }
            Err(err) => Err(ProbeError::from(err)),
        };

        Outcome {
            elapsed: start.elapsed(),
            result,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_status_is_none_on_failure() {
        let outcome = Outcome {
            elapsed: Duration::from_millis(5),
            result: Err(ProbeError::Timeout),
        };
        assert_eq!(outcome.status(), None);
        assert!(!outcome.is_status(200));
    }

    #[test]
    fn outcome_status_reads_the_response() {
        let outcome = Outcome {
            elapsed: Duration::from_millis(5),
            result: Ok(ProbeResponse {
                status: 201,
                body: b"{}".to_vec(),
            }),
        };
        assert!(outcome.is_status(201));
    }

    #[test]
    fn response_json_rejects_malformed_bodies() {
        let response = ProbeResponse {
            status: 200,
            body: b"not json".to_vec(),
        };
        assert!(response.json::<serde_json::Value>().is_err());
    }
}
