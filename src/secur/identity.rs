//! Remote identity capability: resolves a stored credential into a member.
//!
//! Used for both the first login and the re-verification of a stale cache;
//! there is no separate refresh endpoint.

use super::member::Member;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info_span, Instrument};
use url::Url;

const CURRENT_MEMBER_PATH: &str = "members/@me";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw failure reported by an identity client, before classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteFailure {
    /// The service answered with a non-success status.
    Status { code: u16, message: Option<String> },
    /// No response: connection, DNS or timeout failure.
    Transport(String),
    /// Anything else, e.g. an unreadable response body.
    Unexpected(String),
}

#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Fetches the member that owns `credential`.
    ///
    /// `None` means no credential is stored; the service decides how to
    /// answer an anonymous request.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] describing why no member was returned.
    async fn fetch_current_user(
        &self,
        credential: Option<&SecretString>,
    ) -> Result<Member, RemoteFailure>;
}

/// Identity client backed by `GET {base}/members/@me` with a bearer credential.
#[derive(Clone, Debug)]
pub struct HttpIdentityClient {
    client: Client,
    endpoint: Url,
}

impl HttpIdentityClient {
    /// # Errors
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Self::with_client(client, base_url)
    }

    /// # Errors
    /// Returns an error if `base_url` is not a valid URL.
    pub fn with_client(client: Client, base_url: &str) -> anyhow::Result<Self> {
        // Keep the base path: "https://api.tld/v1" must resolve to "/v1/members/@me".
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(CURRENT_MEMBER_PATH)?;
        debug!("identity endpoint: {endpoint}");
        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn transport_failure(err: &reqwest::Error) -> RemoteFailure {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        RemoteFailure::Transport(err.to_string())
    } else {
        RemoteFailure::Unexpected(err.to_string())
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn fetch_current_user(
        &self,
        credential: Option<&SecretString>,
    ) -> Result<Member, RemoteFailure> {
        let mut request = self.client.get(self.endpoint.clone());
        if let Some(credential) = credential {
            request = request.bearer_auth(credential.expose_secret());
        }

        let span = info_span!(
            "identity.fetch_current_user",
            http.method = "GET",
            url = %self.endpoint
        );
        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(|err| transport_failure(&err))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .as_ref()
                .and_then(error_message);
            return Err(RemoteFailure::Status {
                code: status.as_u16(),
                message,
            });
        }

        response
            .json::<Member>()
            .await
            .map_err(|err| RemoteFailure::Unexpected(format!("invalid member payload: {err}")))
    }
}
