use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::auth::Session;

use crate::error::UpstreamError;
use crate::messages::CONNECTION_FAILED;
use crate::normalize::UpstreamReply;

pub const STUDENT_PATH: &str = "/movil/estudiante";
pub const GRADES_PATH: &str = "/movil/estudiante/calificaciones";
pub const KARDEX_PATH: &str = "/movil/estudiante/kardex";
pub const SCHEDULE_PATH: &str = "/movil/estudiante/horarios";
pub const LOGIN_PATH: &str = "/login";

/// Thin transport over the institutional API. Only network failures are
/// errors here; interpreting the reply is the normalizer's job.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.upstream_api_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get(&self, path: &str, session: &Session) -> Result<UpstreamReply, UpstreamError> {
        let request = self
            .client
            .request(Method::GET, self.url(path))
            .header(AUTHORIZATION, session.bearer());

        self.send(path, request).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<UpstreamReply, UpstreamError> {
        let request = self.client.request(Method::POST, self.url(path)).json(body);
        self.send(path, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<UpstreamReply, UpstreamError> {
        debug!("Upstream request to {}", path);

        let response = request
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Upstream request to {} failed: {}", path, e);
                UpstreamError::transport(CONNECTION_FAILED)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Reading upstream body from {} failed: {}", path, e);
            UpstreamError::transport(CONNECTION_FAILED)
        })?;

        let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|e| {
            debug!("Upstream body from {} is not JSON: {}", path, e);
            Value::Null
        });

        debug!("Upstream {} answered HTTP {}", path, status);
        Ok(UpstreamReply::new(status, body))
    }
}
