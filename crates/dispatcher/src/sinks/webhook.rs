//! WebhookSink - multipart HTTP delivery to a fixed endpoint

use tracing::{debug, instrument};

use contracts::{Payload, RelayError, SinkClient};

/// Message flag: render no link-preview embeds
const SUPPRESS_EMBEDS: u64 = 1 << 2;
/// Message flag: deliver without notifying channel members
const SUPPRESS_NOTIFICATIONS: u64 = 1 << 12;

/// Sink that posts a batch to a webhook endpoint as one multipart request:
/// a `payload_json` part carrying text and flags, plus one file part per
/// payload.
pub struct WebhookSink {
    name: String,
    url: String,
    http: reqwest::Client,
}

impl WebhookSink {
    /// Create a new WebhookSink for the given endpoint
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }

    fn build_form(&self, text: &str, payloads: &[Payload], silent: bool) -> reqwest::multipart::Form {
        let mut flags = SUPPRESS_EMBEDS;
        if silent {
            flags |= SUPPRESS_NOTIFICATIONS;
        }
        let meta = serde_json::json!({ "content": text, "flags": flags });

        let mut form = reqwest::multipart::Form::new().text("payload_json", meta.to_string());
        for (index, payload) in payloads.iter().enumerate() {
            let part = reqwest::multipart::Part::bytes(payload.data.to_vec())
                .file_name(payload.filename.clone());
            form = form.part(format!("files[{index}]"), part);
        }
        form
    }
}

impl SinkClient for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "webhook_sink_deliver",
        skip(self, text, payloads),
        fields(sink = %self.name, payloads = payloads.len())
    )]
    async fn deliver(
        &self,
        text: &str,
        payloads: &[Payload],
        silent: bool,
    ) -> Result<(), RelayError> {
        let form = self.build_form(text, payloads, silent);

        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::sink_delivery(&self.name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::sink_delivery(
                &self.name,
                format!("endpoint returned {status}"),
            ));
        }

        debug!(sink = %self.name, %status, "batch delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_deliver_posts_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new("main", format!("{}/hook", server.uri()));
        let payloads = vec![Payload::new(vec![1u8, 2, 3], "1_0.jpg")];

        let result = sink.deliver("hi", &payloads, false).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_server_error_is_delivery_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = WebhookSink::new("main", format!("{}/hook", server.uri()));
        let result = sink.deliver("hi", &[], true).await;

        assert!(matches!(result, Err(RelayError::SinkDelivery { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_delivery_failure() {
        let sink = WebhookSink::new("main", "http://127.0.0.1:1/hook");
        let result = sink.deliver("hi", &[], false).await;
        assert!(matches!(result, Err(RelayError::SinkDelivery { .. })));
    }
}
