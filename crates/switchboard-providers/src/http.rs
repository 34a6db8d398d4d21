use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use switchboard_core::{
    AdapterResponse, Error, NormalizedRequest, ProviderAdapter, Result, Usage,
};

/// Generic JSON-over-HTTP provider adapter.
///
/// Posts the normalized request to a single endpoint and expects a
/// `{ result, usage }` JSON body back. Backends with bespoke wire formats
/// get their own adapter; this one covers the common internal-service case.
pub struct HttpProvider {
    /// Adapter name, as registered with the orchestrator.
    name: String,
    /// HTTP client for backend requests.
    client: Client,
    /// Endpoint URL the normalized request is posted to.
    endpoint: String,
    /// Optional bearer token sent with every request.
    api_key: Option<String>,
}

impl HttpProvider {
    /// Creates a new HTTP provider for the given endpoint.
    pub fn new<N: Into<String>, E: Into<String>>(name: N, endpoint: E) -> Self {
        Self {
            name: name.into(),
            client: Client::default(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Sets the bearer token sent with every request.
    #[must_use]
    pub fn with_api_key<T: Into<String>>(mut self, api_key: T) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Maps a non-success HTTP status to the adapter error taxonomy.
    fn status_error(status: StatusCode, body: String) -> Error {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Error::Auth(format!("{status}: {body}"))
            }
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(format!("{status}: {body}")),
            _ => Error::Provider(format!("{status}: {body}")),
        }
    }
}

/// Request payload posted to the backend.
#[derive(Debug, Serialize)]
struct WireRequest<'req> {
    /// Task type being requested.
    task_type: &'req str,
    /// Caller-supplied payload, passed through untouched.
    payload: &'req serde_json::Value,
}

/// Response payload expected from the backend.
#[derive(Debug, Deserialize)]
struct WireResponse {
    /// Normalized result produced by the backend.
    result: serde_json::Value,
    /// Usage the backend metered for the call.
    #[serde(default)]
    usage: WireUsage,
}

/// Usage accounting block in the backend response.
#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    /// Tokens consumed from the input.
    #[serde(default)]
    input_tokens: u64,
    /// Tokens produced in the output.
    #[serde(default)]
    output_tokens: u64,
    /// Bytes processed, for byte-metered backends.
    #[serde(default)]
    bytes: u64,
}

#[async_trait]
impl ProviderAdapter for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &NormalizedRequest) -> Result<AdapterResponse> {
        let wire = WireRequest {
            task_type: &request.task_type,
            payload: &request.payload,
        };

        let mut builder = self.client.post(&self.endpoint).json(&wire);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, body));
        }

        let body: WireResponse = response
            .json()
            .await
            .map_err(|error| Error::InvalidResponse(error.to_string()))?;

        let usage = Usage {
            input_tokens: body.usage.input_tokens,
            output_tokens: body.usage.output_tokens,
            bytes: body.usage.bytes,
        };

        Ok(AdapterResponse::new(body.result, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_core::FailureKind;

    #[test]
    fn test_status_mapping() {
        let auth = HttpProvider::status_error(StatusCode::UNAUTHORIZED, String::new());
        assert_eq!(auth.kind(), FailureKind::Auth);

        let limited = HttpProvider::status_error(StatusCode::TOO_MANY_REQUESTS, String::new());
        assert_eq!(limited.kind(), FailureKind::RateLimited);

        let server = HttpProvider::status_error(StatusCode::INTERNAL_SERVER_ERROR, String::new());
        assert_eq!(server.kind(), FailureKind::Provider);
    }

    #[test]
    fn test_wire_response_defaults() {
        let body: WireResponse = match serde_json::from_str(r#"{"result": "ok"}"#) {
            Ok(body) => body,
            Err(error) => panic!("parse failed: {error}"),
        };
        assert_eq!(body.usage.input_tokens, 0);
        assert_eq!(body.usage.bytes, 0);
    }
}
