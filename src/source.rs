use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::parser::Document;
use crate::settings::Settings;

/// Where custody documents come from. One call per request, no retries.
#[async_trait]
pub trait Source: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Document, SourceError>;
}

/// Fetches the upstream page or API response over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    url_template: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> Result<Self, SourceError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self {
            client,
            url_template: settings.upstream_url.clone(),
            timeout,
        })
    }

    fn url_for(&self, id: &str) -> String {
        self.url_template.replace("{id}", &urlencoding::encode(id))
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn fetch(&self, id: &str) -> Result<Document, SourceError> {
        let url = self.url_for(id);
        debug!(url = %url, "fetching upstream document");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "upstream request failed");
            if e.is_timeout() {
                SourceError::Timeout(self.timeout.as_secs())
            } else {
                SourceError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "upstream returned non-success status");
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout.as_secs())
            } else {
                SourceError::Request(e)
            }
        })?;
        debug!(bytes = body.len(), content_type = ?content_type, "upstream document received");

        Document::from_body(body, content_type.as_deref()).map_err(SourceError::MalformedJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_id_into_template() {
        let settings = Settings {
            upstream_url: "https://records.example.org/api/custody/{id}?format=full".into(),
            ..Settings::default()
        };
        let source = HttpSource::new(&settings).unwrap();
        assert_eq!(
            source.url_for("0a1b2c3d-0000-4000-8000-00000000abcd"),
            "https://records.example.org/api/custody/0a1b2c3d-0000-4000-8000-00000000abcd?format=full"
        );
    }
}
