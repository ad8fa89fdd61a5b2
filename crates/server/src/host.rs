//! # Webhook Host
//!
//! `MaterialHost` that forwards apply payloads to an HTTP endpoint. The
//! POST runs on its own task; failures are logged and never reach the view.

use materia_core::MaterialHost;
use reqwest::header::CONTENT_TYPE;

pub struct WebhookHost {
    client: reqwest::Client,
    url: String,
}

impl WebhookHost {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl MaterialHost for WebhookHost {
    fn apply_material(&self, material_json: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(url = %self.url, "No runtime available, dropping apply payload");
            return;
        };

        let request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(material_json.to_string());
        let url = self.url.clone();

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!(url = %url, "Apply payload delivered");
                }
                Ok(response) => {
                    tracing::warn!(url = %url, status = %response.status(), "Host webhook rejected apply payload");
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Host webhook unreachable");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_posts_payload_to_webhook() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/apply")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(r#"{"id": "pin_1"}"#.into()))
            .with_status(204)
            .create_async()
            .await;

        let host = WebhookHost::new(format!("{}/apply", server.url()));
        host.apply_material(r#"{"id": "pin_1", "title": "Teak"}"#);

        for _ in 0..50 {
            if mock.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert_async().await;
    }

    #[test]
    fn test_without_runtime_is_noop() {
        let host = WebhookHost::new("http://127.0.0.1:9/apply");
        host.apply_material("{}");
        assert_eq!(host.url(), "http://127.0.0.1:9/apply");
    }
}
