//! Booking backend REST client and session tokens

pub mod models;

pub use models::{Amount, ListingLocation, Package, PackageField, Property, PropertyField, PropertyType};

use crate::config::BackendConfig;
use crate::storage::PreferenceStore;
use crate::{Result, TravelError};
use models::ListResponse;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use strum::{Display, IntoStaticStr};
use tracing::{debug, info, instrument, warn};

/// JSON client for the listings API
pub struct BackendClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(format!("atoll-travel/{}", crate::VERSION))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` on every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use `explicit` when given, otherwise the stored customer token.
    #[must_use]
    pub fn with_session_token<P: PreferenceStore>(
        self,
        explicit: Option<String>,
        tokens: &SessionTokens<P>,
    ) -> Self {
        let token = explicit.or_else(|| match tokens.get(SessionRole::Customer) {
            Ok(token) => token,
            Err(e) => {
                warn!("Stored customer token unreadable: {}", e);
                None
            }
        });
        match token {
            Some(token) => self.with_token(token),
            None => self,
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.endpoint_url(endpoint);
        debug!("Backend request: {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Backend returned {} for {}", status, url);
            return Err(TravelError::api(format!(
                "{} {} ({})",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error"),
                endpoint
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TravelError::api(format!("Invalid response from {endpoint}: {e}")))
    }

    #[instrument(skip(self))]
    pub async fn properties(&self) -> Result<Vec<Property>> {
        let properties = self
            .get_json::<ListResponse<Property>>("properties/")
            .await?
            .into_items();
        info!("Fetched {} properties", properties.len());
        Ok(properties)
    }

    #[instrument(skip(self))]
    pub async fn property(&self, id: u64) -> Result<Property> {
        self.get_json(&format!("properties/{id}/")).await
    }

    #[instrument(skip(self))]
    pub async fn packages(&self) -> Result<Vec<Package>> {
        let packages = self
            .get_json::<ListResponse<Package>>("packages/")
            .await?
            .into_items();
        info!("Fetched {} packages", packages.len());
        Ok(packages)
    }
}

/// Who a stored session token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum SessionRole {
    #[strum(serialize = "admin_token")]
    Admin,
    #[strum(serialize = "customer_token")]
    Customer,
}

/// Admin and customer tokens, kept under separate keys so signing in as one
/// never clobbers the other.
pub struct SessionTokens<P> {
    prefs: P,
}

impl<P: PreferenceStore> SessionTokens<P> {
    pub fn new(prefs: P) -> Self {
        Self { prefs }
    }

    pub fn get(&self, role: SessionRole) -> Result<Option<String>> {
        self.prefs.get_pref(role.into())
    }

    pub fn set(&self, role: SessionRole, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(TravelError::validation("session token must not be empty"));
        }
        self.prefs.set_pref(role.into(), token)?;
        debug!("Stored {} session token", role);
        Ok(())
    }

    pub fn clear(&self, role: SessionRole) -> Result<()> {
        self.prefs.remove_pref(role.into())
    }

    pub fn is_authenticated(&self, role: SessionRole) -> bool {
        matches!(self.get(role), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPreferences;
    use crate::test_support::{http_response, serve_once};

    fn local_client(base_url: &str) -> BackendClient {
        let config = BackendConfig {
            base_url: base_url.to_string(),
            ..BackendConfig::default()
        };
        BackendClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_url() {
        let config = BackendConfig {
            base_url: "https://api.example.mv/api/".to_string(),
            ..BackendConfig::default()
        };
        let client = BackendClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint_url("properties/"),
            "https://api.example.mv/api/properties/"
        );
        assert_eq!(
            client.endpoint_url("/packages/3/"),
            "https://api.example.mv/api/packages/3/"
        );
    }

    #[test]
    fn test_tokens_are_kept_per_role() {
        let prefs = MemoryPreferences::new();
        let tokens = SessionTokens::new(&prefs);

        tokens.set(SessionRole::Admin, "admin-jwt").unwrap();
        tokens.set(SessionRole::Customer, "customer-jwt").unwrap();
        assert_eq!(prefs.get_pref("admin_token").unwrap().as_deref(), Some("admin-jwt"));

        tokens.clear(SessionRole::Customer).unwrap();
        assert!(tokens.is_authenticated(SessionRole::Admin));
        assert!(!tokens.is_authenticated(SessionRole::Customer));
        assert_eq!(tokens.get(SessionRole::Admin).unwrap().as_deref(), Some("admin-jwt"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let tokens = SessionTokens::new(MemoryPreferences::new());
        assert!(matches!(
            tokens.set(SessionRole::Customer, " "),
            Err(TravelError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_server_error_becomes_api_error() {
        let (base_url, server) =
            serve_once(http_response("500 Internal Server Error", &[], "{}")).await;
        let err = local_client(&base_url).properties().await.unwrap_err();
        server.await.unwrap();
        match err {
            TravelError::Api { message } => {
                assert!(message.contains("500"), "{message}");
                assert!(message.contains("properties/"), "{message}");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bearer_token_sent() {
        let body = r#"[{"id": 7, "name": "Dive Week", "price": "1800"}]"#;
        let (base_url, server) = serve_once(http_response("200 OK", &[], body)).await;
        let packages = local_client(&base_url)
            .with_token("tok123")
            .packages()
            .await
            .unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert_eq!(packages.len(), 1);
        assert!(request.starts_with("get /packages/ "), "{request}");
        assert!(request.contains("authorization: bearer tok123\r\n"), "{request}");
    }

    #[tokio::test]
    async fn test_stored_customer_token_used_by_default() {
        let prefs = MemoryPreferences::new();
        let tokens = SessionTokens::new(&prefs);
        tokens.set(SessionRole::Admin, "admin-jwt").unwrap();
        tokens.set(SessionRole::Customer, "customer-jwt").unwrap();

        let body = r#"{"id": 3, "name": "Lagoon House"}"#;
        let (base_url, server) = serve_once(http_response("200 OK", &[], body)).await;
        let property = local_client(&base_url)
            .with_session_token(None, &tokens)
            .property(3)
            .await
            .unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert_eq!(property.name, "Lagoon House");
        assert!(request.contains("authorization: bearer customer-jwt\r\n"), "{request}");
    }

    #[test]
    fn test_explicit_token_wins_over_stored() {
        let prefs = MemoryPreferences::new();
        let tokens = SessionTokens::new(&prefs);
        tokens.set(SessionRole::Customer, "customer-jwt").unwrap();

        let client = local_client("http://localhost")
            .with_session_token(Some("cli-token".into()), &tokens);
        assert_eq!(client.token.as_deref(), Some("cli-token"));

        let anonymous = local_client("http://localhost")
            .with_session_token(None, &SessionTokens::new(MemoryPreferences::new()));
        assert_eq!(anonymous.token, None);
    }
}
