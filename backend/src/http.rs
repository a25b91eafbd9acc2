//! Thin HTTP wrapper over the hosted auth and REST endpoints.
//!
//! Every request carries the project `apikey`. Calls made on behalf of a
//! signed-in visitor add their access token as the bearer; the rest use the
//! anon key. Responses are read as text and parsed separately so a malformed
//! body surfaces as [`BackendError::Decode`] with the status still known.

use gate::ApplicationUser;
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::models::{ApiErrorBody, NewProfile, ProfileUpdate, SignUpResponse, TokenGrant};

const USERS_TABLE: &str = "/rest/v1/users";

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone, Debug)]
pub struct HostedClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl HostedClient {
    /// # Errors
    ///
    /// [`BackendError::Config`] when the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        let http = builder.build().map_err(|e| BackendError::Config(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    pub(crate) async fn password_grant(&self, email: &str, password: &str) -> Result<TokenGrant, BackendError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.token("password", &body).await
    }

    pub(crate) async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenGrant, BackendError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        self.token("refresh_token", &body).await
    }

    pub(crate) async fn pkce_grant(&self, auth_code: &str, code_verifier: &str) -> Result<TokenGrant, BackendError> {
        let body = serde_json::json!({ "auth_code": auth_code, "code_verifier": code_verifier });
        self.token("pkce", &body).await
    }

    pub(crate) async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpResponse, BackendError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "display_name": display_name },
        });
        let request = self.http.post(self.config.endpoint("/auth/v1/signup")).json(&body);
        self.send(request, None).await
    }

    pub(crate) async fn logout(&self, access_token: &str) -> Result<(), BackendError> {
        let request = self.http.post(self.config.endpoint("/auth/v1/logout"));
        self.send_empty(request, Some(access_token)).await
    }

    /// Provider consent URL the browser is sent to for an OAuth sign-in.
    ///
    /// # Errors
    ///
    /// [`BackendError::Config`] when the base URL does not parse.
    pub fn authorize_url(&self, provider: &str, code_challenge: &str) -> Result<String, BackendError> {
        let url = reqwest::Url::parse_with_params(
            &self.config.endpoint("/auth/v1/authorize"),
            &[
                ("provider", provider),
                ("redirect_to", self.config.oauth_redirect_url.as_str()),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "s256"),
            ],
        )
        .map_err(|e| BackendError::Config(e.to_string()))?;
        Ok(url.into())
    }

    async fn token(&self, grant_type: &str, body: &serde_json::Value) -> Result<TokenGrant, BackendError> {
        let request = self
            .http
            .post(self.config.endpoint("/auth/v1/token"))
            .query(&[("grant_type", grant_type)])
            .json(body);
        self.send(request, None).await
    }

    // -------------------------------------------------------------------------
    // Users table
    // -------------------------------------------------------------------------

    pub(crate) async fn select_user(
        &self,
        id: &str,
        access_token: Option<&str>,
    ) -> Result<Option<ApplicationUser>, BackendError> {
        let request = self
            .http
            .get(self.config.endpoint(USERS_TABLE))
            .query(&[("id", format!("eq.{id}").as_str()), ("select", "*")]);
        let rows: Vec<ApplicationUser> = self.send(request, access_token).await?;
        Ok(rows.into_iter().next())
    }

    pub(crate) async fn insert_user(
        &self,
        row: &NewProfile,
        access_token: &str,
    ) -> Result<Option<ApplicationUser>, BackendError> {
        let request = self
            .http
            .post(self.config.endpoint(USERS_TABLE))
            .header("Prefer", "return=representation")
            .json(row);
        let rows: Vec<ApplicationUser> = self.send(request, Some(access_token)).await?;
        Ok(rows.into_iter().next())
    }

    pub(crate) async fn update_user(
        &self,
        id: &str,
        update: &ProfileUpdate,
        access_token: &str,
    ) -> Result<Option<ApplicationUser>, BackendError> {
        let request = self
            .http
            .patch(self.config.endpoint(USERS_TABLE))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(update);
        let rows: Vec<ApplicationUser> = self.send(request, Some(access_token)).await?;
        Ok(rows.into_iter().next())
    }

    // -------------------------------------------------------------------------
    // Plumbing
    // -------------------------------------------------------------------------

    fn authorize(&self, request: reqwest::RequestBuilder, access_token: Option<&str>) -> reqwest::RequestBuilder {
        let bearer = access_token.unwrap_or(self.config.anon_key.as_str());
        request
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        access_token: Option<&str>,
    ) -> Result<T, BackendError> {
        let text = self.execute(request, access_token).await?;
        parse_body(&text)
    }

    async fn send_empty(&self, request: reqwest::RequestBuilder, access_token: Option<&str>) -> Result<(), BackendError> {
        self.execute(request, access_token).await.map(|_| ())
    }

    async fn execute(&self, request: reqwest::RequestBuilder, access_token: Option<&str>) -> Result<String, BackendError> {
        let response = self.authorize(request, access_token).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, "backend request rejected");
            return Err(BackendError::Status { status, message: error_message(&text) });
        }
        Ok(text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, BackendError> {
    serde_json::from_str(text).map_err(|e| BackendError::Decode(e.to_string()))
}

fn error_message(text: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(text)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| text.trim().to_owned())
}

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;
