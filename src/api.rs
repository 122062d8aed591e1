//! REST client for the custody backend.
//!
//! Every call is one-shot: no retries, no backoff. Failures come back as
//! [`TidewatchError::Http`] (transport) or [`TidewatchError::Api`]
//! (non-2xx, carrying the server's `error` message when it sent one) and
//! the caller decides whether to alert or log.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{
    AddressResponse, DepositAddress, DepositRecord, ErrorBody, LoginRequest, LoginResponse,
    RefreshAddressRequest, RegisterRequest, Selection,
};
use crate::{Result, TidewatchError};

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const CURRENT_ADDRESS_PATH: &str = "/api/deposit/current-address";
const ADDRESS_PATH: &str = "/api/deposit/address";
const REFRESH_ADDRESS_PATH: &str = "/api/deposit/refresh-address";
const PENDING_PATH: &str = "/api/deposit/pending";
const HISTORY_PATH: &str = "/api/deposit/history";

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client using the given TLS configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TidewatchError::Tls`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, tls_config: rustls::ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .use_preconfigured_tls(tls_config)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TidewatchError::Tls(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, http))
    }

    /// Wraps an already configured [`reqwest::Client`].
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Exchanges credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if the backend rejects the
    /// credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let request = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { username, password });
        decode(send(request, LOGIN_PATH).await?).await
    }

    /// Creates a new depositor account.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if the backend refuses the
    /// registration (e.g. the username is taken).
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let request = self.http.post(self.url(REGISTER_PATH)).json(&RegisterRequest {
            username,
            email,
            password,
        });
        expect_success(send(request, REGISTER_PATH).await?).await
    }

    /// Fetches the address already assigned to `selection`, without
    /// creating one.
    ///
    /// # Errors
    ///
    /// Returns [`TidewatchError::Api`] when no address exists yet.
    pub async fn current_address(&self, token: &str, selection: &Selection) -> Result<DepositAddress> {
        self.get_address(CURRENT_ADDRESS_PATH, token, selection).await
    }

    /// Fetches the address for `selection`, creating one if needed.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn get_or_create_address(
        &self,
        token: &str,
        selection: &Selection,
    ) -> Result<DepositAddress> {
        self.get_address(ADDRESS_PATH, token, selection).await
    }

    /// Issues a fresh address for `selection`, retiring the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn refresh_address(&self, token: &str, selection: &Selection) -> Result<DepositAddress> {
        let request = self
            .http
            .post(self.url(REFRESH_ADDRESS_PATH))
            .bearer_auth(token)
            .json(&RefreshAddressRequest::from(selection));
        let response: AddressResponse = decode(send(request, REFRESH_ADDRESS_PATH).await?).await?;
        Ok(DepositAddress::from_response(response, selection))
    }

    /// Lists deposits that have not reached a terminal status.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn pending_deposits(&self, token: &str) -> Result<Vec<DepositRecord>> {
        let request = self.http.get(self.url(PENDING_PATH)).bearer_auth(token);
        decode(send(request, PENDING_PATH).await?).await
    }

    /// Lists every deposit of the user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn deposit_history(&self, token: &str) -> Result<Vec<DepositRecord>> {
        let request = self.http.get(self.url(HISTORY_PATH)).bearer_auth(token);
        decode(send(request, HISTORY_PATH).await?).await
    }

    async fn get_address(
        &self,
        path: &str,
        token: &str,
        selection: &Selection,
    ) -> Result<DepositAddress> {
        let request = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .query(&[
                ("chain", selection.chain.as_str()),
                ("tokenAddress", selection.token_query()),
            ]);
        let response: AddressResponse = decode(send(request, path).await?).await?;
        Ok(DepositAddress::from_response(response, selection))
    }
}

async fn send(request: RequestBuilder, path: &str) -> Result<Response> {
    debug!(path, "sending request");
    request.send().await.map_err(|e| {
        warn!(path, error = %e, "request failed before a response arrived");
        TidewatchError::Http(e)
    })
}

/// Parses a 2xx body as `T`, or converts the failure into an error.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Discards a 2xx body, or converts the failure into an error.
async fn expect_success(response: Response) -> Result<()> {
    check_status(response).await.map(|_| ())
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("error")
            )
        });

    debug!(status = status.as_u16(), %message, "backend returned an error");
    Err(TidewatchError::Api {
        status: status.as_u16(),
        message,
    })
}
