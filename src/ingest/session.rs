use std::time::Duration;

use crate::config::BackendEndpoint;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Start/stop control for the analysis service's capture session.
/// Calls are idempotent on the service side and never report failure.
#[derive(Clone)]
pub struct SessionClient {
    http: reqwest::Client,
    endpoint: BackendEndpoint,
}

impl SessionClient {
    pub fn new(endpoint: BackendEndpoint) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|err| {
                log::warn!("Falling back to default HTTP client: {err}");
                reqwest::Client::new()
            });
        Self { http, endpoint }
    }

    pub fn port(&self) -> u16 {
        self.endpoint.port
    }

    pub fn endpoint(&self) -> &BackendEndpoint {
        &self.endpoint
    }

    pub async fn start_session(&self) {
        self.post("/api/cv/start-session").await;
    }

    pub async fn stop_session(&self) {
        self.post("/api/cv/stop-session").await;
    }

    /// Fire-and-forget start for callers that must not wait on the service.
    pub fn start_session_detached(&self) {
        let client = self.clone();
        tokio::spawn(async move { client.start_session().await });
    }

    async fn post(&self, path: &str) {
        let url = self.endpoint.http_url(path);
        match self.http.post(&url).send().await {
            Ok(response) if response.status().is_success() => {
                log::debug!("POST {url} -> {}", response.status());
            }
            Ok(response) => log::debug!("POST {url} answered {}", response.status()),
            Err(err) => log::debug!("POST {url} failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_service_is_swallowed() {
        // Port 9 (discard) is essentially never served on loopback.
        let client = SessionClient::new(BackendEndpoint::new("127.0.0.1", 9));
        client.start_session().await;
        client.stop_session().await;
        assert_eq!(client.port(), 9);
    }
}
