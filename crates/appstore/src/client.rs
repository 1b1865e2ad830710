//! Build upload lookups against the App Store Connect REST API.

use std::time::Duration;

use async_trait::async_trait;
use events::{BuildInfoSource, BuildUploadInfo, EnrichmentError, InstanceId};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::credentials::{CredentialConfig, TokenProvider};

/// Production API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.appstoreconnect.apple.com";

/// Default bound on one lookup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`AppStoreClient`].
#[derive(Debug, Clone)]
pub struct AppStoreConfig {
    /// API base URL, without a trailing `/v1`.
    pub base_url: String,
    /// Credential material.
    pub credentials: CredentialConfig,
    /// App name attached to every fetched build.
    pub app_name: Option<String>,
    /// Bound on one lookup, including the response body.
    pub timeout: Duration,
}

impl Default for AppStoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            credentials: CredentialConfig::default(),
            app_name: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BuildUploadResponse {
    data: Option<BuildUploadResource>,
}

#[derive(Debug, Deserialize)]
struct BuildUploadResource {
    attributes: Option<BuildUploadAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildUploadAttributes {
    cf_bundle_short_version_string: Option<String>,
    cf_bundle_version: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// App Store Connect client implementing [`BuildInfoSource`].
///
/// Each lookup signs (or reuses a pre-generated) bearer token and performs a
/// single `GET /v1/buildUploads/{id}`. There is no retry.
#[derive(Debug, Clone)]
pub struct AppStoreClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenProvider,
    app_name: Option<String>,
    timeout: Duration,
}

impl AppStoreClient {
    /// Creates a client with its own connection pool.
    pub fn new(config: AppStoreConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Creates a client over an existing `reqwest::Client`.
    pub fn with_http_client(config: AppStoreConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: TokenProvider::new(config.credentials),
            app_name: config.app_name,
            timeout: config.timeout,
        }
    }

    /// URL of the build upload resource.
    pub fn build_upload_url(&self, build_upload_id: &InstanceId) -> String {
        format!("{}/v1/buildUploads/{}", self.base_url, build_upload_id)
    }

    fn parse_build_info(&self, body: &[u8]) -> Result<BuildUploadInfo, EnrichmentError> {
        let response: BuildUploadResponse = serde_json::from_slice(body)
            .map_err(|e| EnrichmentError::MalformedResponse(e.to_string()))?;

        let attributes = response
            .data
            .and_then(|d| d.attributes)
            .ok_or_else(|| EnrichmentError::MalformedResponse("missing data.attributes".into()))?;

        let version = attributes.cf_bundle_short_version_string.ok_or_else(|| {
            EnrichmentError::MalformedResponse("missing cfBundleShortVersionString".into())
        })?;
        let build = attributes
            .cf_bundle_version
            .ok_or_else(|| EnrichmentError::MalformedResponse("missing cfBundleVersion".into()))?;

        Ok(BuildUploadInfo {
            version,
            build,
            app_name: self.app_name.clone(),
        })
    }
}

#[async_trait]
impl BuildInfoSource for AppStoreClient {
    #[instrument(skip_all, fields(build_upload_id = %build_upload_id))]
    async fn fetch_build_info(
        &self,
        build_upload_id: &InstanceId,
    ) -> Result<BuildUploadInfo, EnrichmentError> {
        let token = self.tokens.bearer_token()?;
        let url = self.build_upload_url(build_upload_id);
        debug!(%url, "requesting build upload");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "App Store Connect returned error");
            return Err(EnrichmentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(map_transport_error)?;
        let info = self.parse_build_info(&body)?;
        info!(version = %info.version, build = %info.build, "fetched build upload info");
        Ok(info)
    }
}

fn map_transport_error(err: reqwest::Error) -> EnrichmentError {
    if err.is_timeout() {
        EnrichmentError::Timeout
    } else {
        EnrichmentError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(app_name: Option<&str>) -> AppStoreClient {
        AppStoreClient::new(AppStoreConfig {
            base_url: "https://api.example.test/".to_string(),
            app_name: app_name.map(str::to_string),
            ..AppStoreConfig::default()
        })
    }

    #[test]
    fn url_joins_base_and_id() {
        let id = InstanceId::new("abc-123").unwrap();
        assert_eq!(
            client(None).build_upload_url(&id),
            "https://api.example.test/v1/buildUploads/abc-123"
        );
    }

    #[test]
    fn parses_version_and_build() {
        let body = br#"{"data":{"type":"buildUploads","id":"u","attributes":{"cfBundleShortVersionString":"3.1","cfBundleVersion":"77","state":"COMPLETE"}}}"#;

        let info = client(Some("Configured")).parse_build_info(body).unwrap();

        assert_eq!(info.version, "3.1");
        assert_eq!(info.build, "77");
        assert_eq!(info.app_name.as_deref(), Some("Configured"));
    }

    #[test]
    fn app_name_comes_from_configuration() {
        let body = br#"{
            "data": { "attributes": { "cfBundleShortVersionString": "3.1", "cfBundleVersion": "77" } },
            "included": [ { "type": "apps", "id": "1", "attributes": { "name": "From API" } } ]
        }"#;

        let configured = client(Some("Configured")).parse_build_info(body).unwrap();
        assert_eq!(configured.app_name.as_deref(), Some("Configured"));

        let unnamed = client(None).parse_build_info(body).unwrap();
        assert_eq!(unnamed.app_name, None);
    }

    #[test]
    fn missing_attributes_are_malformed() {
        let bodies: [&[u8]; 4] = [
            br#"{"data":{}}"#,
            br#"{"data":{"attributes":{"cfBundleVersion":"1"}}}"#,
            br#"{"data":{"attributes":{"cfBundleShortVersionString":"1"}}}"#,
            b"not json",
        ];
        for body in bodies {
            assert!(matches!(
                client(None).parse_build_info(body),
                Err(EnrichmentError::MalformedResponse(_))
            ));
        }
    }
}
