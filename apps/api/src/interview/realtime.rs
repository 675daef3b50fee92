//! Optional realtime-voice signing.
//!
//! When a signing endpoint is configured, session start fetches a short-lived
//! signed URL the browser uses to open its realtime audio channel. The fetch
//! is bounded at 10 seconds and strictly best-effort: any failure degrades to
//! text-mode interviewing, never an error.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

const SIGNING_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct SigningResponse {
    signed_url: String,
}

/// Requests a signed realtime URL for the session. `None` when no endpoint is
/// configured or the request fails in any way.
pub async fn fetch_signed_url(signing_url: Option<&str>, session_id: Uuid) -> Option<String> {
    let endpoint = signing_url?;

    let client = match reqwest::Client::builder().timeout(SIGNING_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build realtime signing client: {e}");
            return None;
        }
    };

    let response = match client
        .post(endpoint)
        .json(&serde_json::json!({ "session_id": session_id }))
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("Realtime signing request failed: {e}");
            return None;
        }
    };

    if !response.status().is_success() {
        warn!("Realtime signing returned status {}", response.status());
        return None;
    }

    match response.json::<SigningResponse>().await {
        Ok(signed) => Some(signed.signed_url),
        Err(e) => {
            warn!("Realtime signing response unparseable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_endpoint_yields_none() {
        assert!(fetch_signed_url(None, Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_none() {
        let result = fetch_signed_url(Some("http://127.0.0.1:1/sign"), Uuid::new_v4()).await;
        assert!(result.is_none());
    }
}
