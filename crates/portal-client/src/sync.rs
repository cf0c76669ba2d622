//! Client/server session synchronization
//!
//! Keeps a [`PrincipalCache`] consistent with the session service. Pushes
//! update the cache first and then tell the server; pulls ask the server
//! and overwrite the cache with its answer. Failures never propagate: they
//! are logged and the cache keeps whatever it had.

use std::sync::Arc;

use portal_types::{Ack, Principal, SyncRequest, ValidateResponse};
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::cache::{CacheSnapshot, PrincipalCache};
use crate::config::ClientConfig;
use crate::error::ClientError;

const SYNC_PATH: &str = "/api/auth/sync";
const VALIDATE_PATH: &str = "/api/auth/validate";

/// Answer to a validation pull
enum Pulled {
    Present(Principal),
    Absent,
}

/// Sync client owning the principal cache.
#[derive(Debug)]
pub struct SyncClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: PrincipalCache,
}

impl SyncClient {
    /// Build a client with its own cookie-aware HTTP client.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self::with_http_client(config, http))
    }

    /// Use an existing HTTP client, which must keep cookies between calls
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config,
            cache: PrincipalCache::new(),
        }
    }

    pub fn cache(&self) -> &PrincipalCache {
        &self.cache
    }

    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.cache.snapshot()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Cache `principal` locally and mirror it into the server session
    #[instrument(skip_all, fields(user_id = %principal.id))]
    pub async fn push_login(&self, principal: &Principal) {
        self.cache.login(principal.clone());

        let request = SyncRequest::Login {
            user: principal.clone(),
        };
        if let Err(e) = self.send_sync(&request).await {
            warn!(error = %e, "Login sync failed; server session unchanged");
        }
    }

    /// Clear the local cache and the server session
    #[instrument(skip_all)]
    pub async fn push_logout(&self) {
        self.cache.logout();

        if let Err(e) = self.send_sync(&SyncRequest::Logout).await {
            warn!(error = %e, "Logout sync failed; server session unchanged");
        }
    }

    /// Ask the server who we are and adopt its answer.
    ///
    /// Returns the cached principal afterwards. On failure the cache is left
    /// as it was, so the result is the previous hint.
    #[instrument(skip_all)]
    pub async fn pull_validate(&self) -> Option<Principal> {
        match self.fetch_validate().await {
            Ok(Pulled::Present(principal)) => {
                debug!(user_id = %principal.id, "Server session valid");
                self.cache.apply_pull(Some(principal));
            }
            Ok(Pulled::Absent) => {
                debug!("No server session");
                self.cache.apply_pull(None);
            }
            Err(e) => warn!(error = %e, "Validation pull failed; keeping cached principal"),
        }
        self.cache.snapshot().principal.clone()
    }

    /// Enter `Loading`, pull, and settle even if the pull failed
    pub async fn start(&self) -> Arc<CacheSnapshot> {
        self.cache.init();
        self.pull_validate().await;
        self.cache.settle();
        self.cache.snapshot()
    }

    async fn send_sync(&self, request: &SyncRequest) -> Result<(), ClientError> {
        let url = &self.config.endpoint(SYNC_PATH);

        self.config
            .sync_policy
            .run("sync", || async move {
                let response = self
                    .http
                    .post(url)
                    .json(request)
                    .send()
                    .await
                    .map_err(|e| self.map_error(e))?;

                let status = response.status();
                if status.is_success() {
                    return Ok(());
                }

                let message = response
                    .json::<Ack>()
                    .await
                    .ok()
                    .and_then(|ack| ack.error)
                    .unwrap_or_default();
                Err(ClientError::Status {
                    status: status.as_u16(),
                    message,
                })
            })
            .await
    }

    async fn fetch_validate(&self) -> Result<Pulled, ClientError> {
        let url = &self.config.endpoint(VALIDATE_PATH);

        self.config
            .sync_policy
            .run("validate", || async move {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| self.map_error(e))?;

                match response.status() {
                    StatusCode::UNAUTHORIZED => Ok(Pulled::Absent),
                    status if status.is_success() => {
                        let body: ValidateResponse =
                            response.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
                        match body.user {
                            Some(user) if body.success && user.is_valid() => Ok(Pulled::Present(user)),
                            _ => Err(ClientError::Decode(
                                "validation response without a valid user".to_string(),
                            )),
                        }
                    }
                    status => Err(ClientError::Status {
                        status: status.as_u16(),
                        message: String::new(),
                    }),
                }
            })
            .await
    }

    fn map_error(&self, err: reqwest::Error) -> ClientError {
        ClientError::from_reqwest(err, self.config.request_timeout)
    }
}
