use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use url::Url;
use verifier_core::{LookupPayload, LookupQuery, VerificationRequest, VerificationResult};
use verifier_logging::{verifier_debug, verifier_trace};

use crate::classify::{classify_lookup, classify_verification};
use crate::ClientError;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub verify_path: String,
    pub lookup_path: String,
    pub connect_timeout: Duration,
    /// Overall deadline per request. `None` waits for the server indefinitely.
    pub request_timeout: Option<Duration>,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            verify_path: "/verify".to_string(),
            lookup_path: "/api/vat-lookup".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// The two backend endpoints the form talks to.
#[async_trait::async_trait]
pub trait VerificationBackend: Send + Sync {
    async fn lookup_vat(&self, query: &LookupQuery) -> Result<LookupPayload, ClientError>;

    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResult, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{}: {err}", settings.base_url)))?;

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    /// POSTs `body` as JSON and reads the response, enforcing the size cap.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(u16, Vec<u8>), ClientError> {
        let url = self
            .base
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(format!("{path}: {err}")))?;
        let payload =
            serde_json::to_vec(body).map_err(|err| ClientError::InvalidBody(err.to_string()))?;
        verifier_trace!("POST {url} ({} bytes)", payload.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(ClientError::TooLarge { max_bytes });
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(ClientError::TooLarge { max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }
        verifier_debug!("{path} answered {status} with {} bytes", bytes.len());
        Ok((status, bytes))
    }

    fn absolutize(&self, err: ClientError) -> ClientError {
        match err {
            ClientError::AuthExpired { redirect } => ClientError::AuthExpired {
                redirect: resolve_redirect(&self.base, &redirect),
            },
            other => other,
        }
    }
}

#[async_trait::async_trait]
impl VerificationBackend for ReqwestBackend {
    async fn lookup_vat(&self, query: &LookupQuery) -> Result<LookupPayload, ClientError> {
        let (status, body) = self.post_json(&self.settings.lookup_path, query).await?;
        classify_lookup(status, &body).map_err(|err| self.absolutize(err))
    }

    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResult, ClientError> {
        let (status, body) = self.post_json(&self.settings.verify_path, request).await?;
        classify_verification(status, &body).map_err(|err| self.absolutize(err))
    }
}

/// Resolves a server-supplied redirect against the backend base URL. Targets
/// that cannot be joined are returned unchanged.
pub fn resolve_redirect(base: &Url, target: &str) -> String {
    base.join(target)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| target.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::Network(format!("timeout: {err}"));
    }
    ClientError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_redirects_join_base() {
        let base = Url::parse("https://verifier.example/app/").unwrap();
        assert_eq!(
            resolve_redirect(&base, "/login"),
            "https://verifier.example/login"
        );
        assert_eq!(
            resolve_redirect(&base, "https://sso.example/auth"),
            "https://sso.example/auth"
        );
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let settings = ClientSettings {
            base_url: "not a url".to_string(),
            ..ClientSettings::default()
        };
        assert!(matches!(
            ReqwestBackend::new(settings),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
