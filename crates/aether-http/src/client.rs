//! The request pipeline.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use aether_core::{
    AccessToken, Classification, Credential, Credentials, Error, Notice, NotificationSink,
    RefreshToken, Result, ScopeId, SessionStorage, TerminationReason, classify,
};

use crate::config::ClientConfig;
use crate::coordinator::{RefreshCoordinator, SessionPhase};
use crate::descriptor::{RequestDescriptor, TraceId};
use crate::endpoints::{LOGIN, LoginRequest, TokenResponse};
use crate::notify::TracingSink;
use crate::store::CredentialStore;
use crate::transport::HttpTransport;

/// A successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    trace_id: TraceId,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Trace id of the attempt that produced this response.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// A body that does not decode is reported as [`Error::ServerError`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::ServerError {
            status: self.status,
            message: Some(format!("malformed response body: {e}")),
        })
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn SessionStorage>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl ApiClientBuilder {
    /// Persist the session to `storage` and restore it on build.
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Send user-facing notices to `sink` instead of the log.
    pub fn notifier(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the client, restoring any persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the persisted
    /// session cannot be read.
    pub async fn build(self) -> Result<ApiClient> {
        let store = match self.storage {
            Some(storage) => CredentialStore::load(storage).await?,
            None => CredentialStore::in_memory(),
        };
        let store = Arc::new(store);
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        let transport = HttpTransport::new(&self.config)?;

        let coordinator = Arc::new(RefreshCoordinator::new(
            store.clone(),
            transport.clone(),
            self.config.refresh_timeout_value(),
            sink.clone(),
        ));
        debug!(phase = ?coordinator.phase(), base_url = %self.config.base_url(), "Client ready");

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                transport,
                store,
                coordinator,
                sink,
            }),
        })
    }
}

/// Client for the Aether API.
///
/// Every request carries the current access token and active company. When
/// the server answers 401, the client waits for a single shared token
/// renewal and replays the request once with the new token. Cloning is cheap
/// and clones share the session.
///
/// # Example
///
/// ```no_run
/// use aether_core::{ApiUrl, Credentials};
/// use aether_http::{ApiClient, ClientConfig};
///
/// # async fn example() -> aether_core::Result<()> {
/// let config = ClientConfig::new(ApiUrl::new("https://api.example.com/api/v1")?);
/// let client = ApiClient::builder(config).build().await?;
///
/// client
///     .login(&Credentials::new("user@example.com", "secret"), None)
///     .await?;
/// let me: serde_json::Value = client.get_json("/auth/me").await?;
/// println!("{me}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: HttpTransport,
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    sink: Arc<dyn NotificationSink>,
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            storage: None,
            sink: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns the current credential, if logged in.
    pub fn credential(&self) -> Option<Credential> {
        self.inner.store.get()
    }

    pub fn session_phase(&self) -> SessionPhase {
        self.inner.coordinator.phase()
    }

    /// Log in with email and password, optionally selecting a company.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RenewalInProgress`] while a renewal is in flight, or
    /// the classified error if the server rejects the credentials.
    #[instrument(skip(self, credentials, scope), fields(email = %credentials.email()))]
    pub async fn login(
        &self,
        credentials: &Credentials,
        scope: Option<ScopeId>,
    ) -> Result<Credential> {
        if self.session_phase() == SessionPhase::Refreshing {
            return Err(Error::RenewalInProgress);
        }

        let trace_id = TraceId::new();
        let body = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        let raw = self
            .inner
            .transport
            .post_json(
                LOGIN,
                &body,
                self.inner.config.request_timeout_value(),
                trace_id,
            )
            .await
            .map_err(|e| self.report(e, Some(trace_id)))?;

        match classify(&raw) {
            Classification::Success => {}
            Classification::AuthExpired => {
                let err = Error::BadRequest {
                    status: raw.status,
                    message: Some("Incorrect email or password".to_string()),
                };
                return Err(self.report(err, Some(trace_id)));
            }
            Classification::Failure(err) => return Err(self.report(err, Some(trace_id))),
        }

        let tokens: TokenResponse = serde_json::from_slice(&raw.body).map_err(|e| {
            let err = Error::ServerError {
                status: raw.status,
                message: Some(format!("malformed login response: {e}")),
            };
            self.report(err, Some(trace_id))
        })?;

        let credential = Credential::new(
            AccessToken::new(tokens.access_token),
            RefreshToken::new(tokens.refresh_token),
        )
        .with_scope(scope);
        self.inner.coordinator.install(credential.clone()).await?;

        info!("Logged in");
        Ok(credential)
    }

    /// End the session locally.
    ///
    /// Requests waiting on a renewal fail with
    /// [`TerminationReason::LoggedOut`]; a renewal still in flight is
    /// discarded when it completes.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.inner
            .coordinator
            .terminate(TerminationReason::LoggedOut, false)
            .await;
    }

    /// Change the active company for subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionTerminated`] if not logged in.
    #[instrument(skip(self), fields(scope = ?scope.as_ref().map(ScopeId::as_str)))]
    pub async fn switch_scope(&self, scope: Option<ScopeId>) -> Result<()> {
        self.inner.coordinator.switch_scope(scope).await?;
        info!("Switched active company");
        Ok(())
    }

    /// Renew the access token now.
    ///
    /// Joins a renewal already in flight instead of starting a second one.
    pub async fn refresh(&self) -> Result<Credential> {
        self.inner.coordinator.await_renewal().await
    }

    /// Send a request.
    ///
    /// On 401 the request waits for the shared renewal and is replayed once
    /// with the new token. A replay that is rejected again ends the session.
    /// Failures other than session termination are also reported to the
    /// notification sink.
    ///
    /// # Errors
    ///
    /// Returns the classified error for any non-2xx response, or
    /// [`Error::NetworkUnavailable`] if no response arrived.
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method(), path = descriptor.path()))]
    pub async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<ApiResponse> {
        let mut descriptor = descriptor;

        loop {
            let trace_id = descriptor.trace_id();
            let credential = self.inner.store.get();
            let access_token = credential.as_ref().map(Credential::access_token);
            let scope = descriptor
                .scope_override()
                .or_else(|| credential.as_ref().and_then(Credential::scope));

            let raw = self
                .inner
                .transport
                .send(&descriptor, access_token, scope)
                .await
                .map_err(|e| self.report(e, Some(trace_id)))?;

            match classify(&raw) {
                Classification::Success => {
                    return Ok(ApiResponse {
                        status: raw.status,
                        trace_id,
                        body: raw.body,
                    });
                }
                Classification::Failure(err) => return Err(self.report(err, Some(trace_id))),
                Classification::AuthExpired if descriptor.is_replay() => {
                    warn!(%trace_id, "Replayed request was rejected, ending session");
                    let reason = TerminationReason::ReplayRejected;
                    self.inner.coordinator.terminate(reason.clone(), true).await;
                    return Err(Error::session_terminated(reason));
                }
                Classification::AuthExpired => {
                    debug!(%trace_id, "Access token rejected, waiting for renewal");
                    self.inner.coordinator.renew_after(access_token).await?;
                    descriptor = descriptor.replay();
                }
            }
        }
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(RequestDescriptor::get(path)).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(RequestDescriptor::post(path).json(body)?).await
    }

    /// PUT a JSON body and decode the JSON response.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(RequestDescriptor::put(path).json(body)?).await
    }

    /// PATCH with a JSON body and decode the JSON response.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(RequestDescriptor::patch(path).json(body)?).await
    }

    /// DELETE a resource, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.dispatch(RequestDescriptor::delete(path)).await?;
        Ok(())
    }

    async fn send_json<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        let response = self.dispatch(descriptor).await?;
        response
            .json()
            .map_err(|e| self.report(e, Some(response.trace_id())))
    }

    /// Hand a failure to the notification sink, then return it.
    fn report(&self, err: Error, trace_id: Option<TraceId>) -> Error {
        let trace_id = trace_id.map(|id| id.to_string());
        if let Some(notice) = Notice::for_error(&err, trace_id.as_deref()) {
            debug!(error = %err, "Request failed");
            self.inner.sink.notify(notice);
        }
        err
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url().as_str())
            .field("phase", &self.session_phase())
            .finish()
    }
}
