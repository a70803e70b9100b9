/// Generation proxy client — the single point of entry for calls to the
/// external text-generation service.
///
/// ARCHITECTURAL RULE: no other module may call the generation service
/// directly. One endpoint per feature, each a single stateless POST; there
/// are no retries, so every failure reaches the caller's fallback decision
/// immediately.
use reqwest::Client;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::outreach::request::{ColdEmailRequest, HrEmailRequest, LinkedInNoteRequest};

/// Generation calls may legitimately run long; a timeout is still an error
/// outcome and feeds the same failure path as any other proxy error.
const GENERATION_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Proxy error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed proxy payload: {0}")]
    Malformed(String),

    #[error("Proxy returned an empty result")]
    EmptyResult,
}

#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GenerationClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(GENERATION_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Generates a LinkedIn connection note. The request must already be
    /// validated; `intent` and the non-empty form fields go over the wire.
    pub async fn linkedin_note(&self, request: &LinkedInNoteRequest) -> Result<String, ProxyError> {
        let mut form = Map::new();
        for (key, value) in request.form_entries() {
            form.insert(key.to_string(), Value::String(value.to_string()));
        }
        let intent = request.intent.map(|i| i.as_str()).unwrap_or_default();

        self.call(
            "generate-linkedin-note",
            json!({ "intent": intent, "formData": form }),
            "note",
        )
        .await
    }

    pub async fn cold_email(&self, request: &ColdEmailRequest) -> Result<String, ProxyError> {
        self.call(
            "generate-cold-email",
            json!({ "keyPoints": request.key_points, "resume": request.resume }),
            "email",
        )
        .await
    }

    pub async fn hr_email(&self, request: &HrEmailRequest) -> Result<String, ProxyError> {
        self.call(
            "generate-hr-email",
            json!({
                "hrName": request.contact.name,
                "hrPosition": request.contact.position,
                "companyName": request.company,
                "keyPoints": request.key_points,
            }),
            "email",
        )
        .await
    }

    /// Single POST to one feature endpoint. The response carries the result
    /// under a feature-specific field; a missing field, an empty payload or
    /// a non-2xx status are all proxy failures.
    async fn call(&self, path: &str, body: Value, result_field: &str) -> Result<String, ProxyError> {
        let response = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(&body).unwrap_or(body);
            warn!("Generation proxy {path} returned {status}: {message}");
            return Err(ProxyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response.json().await?;
        let text = extract_result(&payload, result_field)?;
        debug!("Generation proxy {path} returned {} chars", text.len());
        Ok(text)
    }
}

/// Pulls the trimmed result string out of a proxy payload. Whitespace-only
/// output counts as empty: an empty generation is never a valid result.
fn extract_result(payload: &Value, field: &str) -> Result<String, ProxyError> {
    let text = payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ProxyError::Malformed(format!("missing '{field}' field")))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(ProxyError::EmptyResult);
    }
    Ok(text.to_string())
}

/// Proxy failures come back as `{"error": "..."}`.
fn parse_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
}
