//! Single-flight token renewal.
//!
//! The coordinator owns the session state machine:
//!
//! ```text
//! Idle ──401──▶ Refreshing ──ok──▶ Idle
//!                   │
//!                   └──failure──▶ Unauthenticated ──login──▶ Idle
//! ```
//!
//! The first caller to report an expired token while `Idle` starts the one
//! renewal call. Everyone arriving while `Refreshing` is queued behind it and
//! resolved in arrival order with the same outcome. State is kept behind a
//! synchronous lock that is never held across an `.await`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use aether_core::{
    AccessToken, Credential, Error, Notice, NotificationSink, RefreshToken, Result, ScopeId,
    TerminationReason,
};

use crate::descriptor::TraceId;
use crate::endpoints::{REFRESH, RefreshRequest, TokenResponse};
use crate::store::CredentialStore;
use crate::transport::HttpTransport;

/// Observable phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// A credential is stored and no renewal is running.
    Idle,
    /// A renewal call is in flight.
    Refreshing,
    /// No usable credential; a login is required.
    Unauthenticated,
}

type Waiter = oneshot::Sender<Result<Credential>>;

enum SessionState {
    Idle,
    Refreshing {
        epoch: u64,
        waiters: VecDeque<Waiter>,
    },
    Unauthenticated,
}

struct CoordinatorState {
    session: SessionState,
    next_epoch: u64,
}

/// What a caller of `renew_after` has to do once the lock is released.
enum Step {
    Ready(Credential),
    Fail { error: Error, notify: bool },
    Wait(oneshot::Receiver<Result<Credential>>),
    Drive {
        rx: oneshot::Receiver<Result<Credential>>,
        epoch: u64,
        refresh_token: RefreshToken,
    },
}

/// Coordinates token renewal for one session.
pub struct RefreshCoordinator {
    state: Mutex<CoordinatorState>,
    store: Arc<CredentialStore>,
    transport: HttpTransport,
    refresh_timeout: Duration,
    sink: Arc<dyn NotificationSink>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        store: Arc<CredentialStore>,
        transport: HttpTransport,
        refresh_timeout: Duration,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let session = if store.get().is_some() {
            SessionState::Idle
        } else {
            SessionState::Unauthenticated
        };

        Self {
            state: Mutex::new(CoordinatorState {
                session,
                next_epoch: 0,
            }),
            store,
            transport,
            refresh_timeout,
            sink,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SessionPhase {
        match self.lock().session {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Refreshing { .. } => SessionPhase::Refreshing,
            SessionState::Unauthenticated => SessionPhase::Unauthenticated,
        }
    }

    /// Wait for a renewed credential.
    ///
    /// Starts a renewal if none is running, otherwise joins the running one.
    /// Fails immediately with [`Error::SessionTerminated`] when the session
    /// is unauthenticated.
    pub async fn await_renewal(self: &Arc<Self>) -> Result<Credential> {
        self.renew_after(None).await
    }

    /// Wait for a credential newer than `sent_with`.
    ///
    /// If the stored access token already differs from the one the failed
    /// request carried, a renewal has completed since and the current
    /// credential is returned without another call.
    #[instrument(skip_all)]
    pub(crate) async fn renew_after(
        self: &Arc<Self>,
        sent_with: Option<&AccessToken>,
    ) -> Result<Credential> {
        let rx = match self.enqueue(sent_with) {
            Step::Ready(credential) => {
                debug!("Credential already renewed");
                return Ok(credential);
            }
            Step::Fail { error, notify } => {
                if notify && let Some(reason) = error.termination_reason() {
                    self.sink.notify(Notice::SessionTerminated {
                        reason: reason.clone(),
                    });
                }
                return Err(error);
            }
            Step::Wait(rx) => rx,
            Step::Drive {
                rx,
                epoch,
                refresh_token,
            } => {
                let coordinator = Arc::clone(self);
                // Spawned so a cancelled driver cannot strand the queue.
                tokio::spawn(async move { coordinator.drive(epoch, refresh_token).await });
                rx
            }
        };

        rx.await.unwrap_or_else(|_| {
            Err(Error::session_terminated(
                TerminationReason::RenewalUnreachable {
                    message: "renewal task ended without a result".to_string(),
                },
            ))
        })
    }

    fn enqueue(&self, sent_with: Option<&AccessToken>) -> Step {
        let mut guard = self.lock();
        let state = &mut *guard;

        match state.session {
            SessionState::Unauthenticated => Step::Fail {
                error: Error::session_terminated(TerminationReason::NotAuthenticated),
                notify: false,
            },
            SessionState::Refreshing {
                ref mut waiters, ..
            } => {
                let (tx, rx) = oneshot::channel();
                waiters.push_back(tx);
                debug!(queued = waiters.len(), "Joined in-flight renewal");
                Step::Wait(rx)
            }
            SessionState::Idle => {
                let Some(current) = self.store.get() else {
                    state.session = SessionState::Unauthenticated;
                    return Step::Fail {
                        error: Error::session_terminated(TerminationReason::NotAuthenticated),
                        notify: true,
                    };
                };

                if let Some(sent) = sent_with
                    && current.access_token() != sent
                {
                    return Step::Ready(current);
                }

                let epoch = state.next_epoch;
                state.next_epoch += 1;

                let (tx, rx) = oneshot::channel();
                state.session = SessionState::Refreshing {
                    epoch,
                    waiters: VecDeque::from([tx]),
                };
                info!(epoch, "Access token expired, starting renewal");

                Step::Drive {
                    rx,
                    epoch,
                    refresh_token: current.refresh_token().clone(),
                }
            }
        }
    }

    /// Perform the renewal call and settle every waiter of `epoch`.
    async fn drive(self: Arc<Self>, epoch: u64, refresh_token: RefreshToken) {
        let outcome = self.request_renewal(&refresh_token).await;
        self.settle(epoch, outcome).await;
    }

    /// Apply a renewal outcome, persist it, then answer the waiters of
    /// `epoch` in the order they queued.
    ///
    /// Waiters are answered only once storage holds the new state.
    async fn settle(
        &self,
        epoch: u64,
        outcome: std::result::Result<(AccessToken, RefreshToken), TerminationReason>,
    ) {
        let (waiters, result) = {
            let mut guard = self.lock();
            let waiters = match &mut guard.session {
                SessionState::Refreshing {
                    epoch: current,
                    waiters,
                } if *current == epoch => std::mem::take(waiters),
                _ => {
                    debug!(epoch, "Session ended during renewal, discarding result");
                    return;
                }
            };

            match outcome {
                Ok((access_token, refresh_token)) => {
                    let renewed = match self.store.get() {
                        Some(current) => current.renewed(access_token, refresh_token),
                        None => Credential::new(access_token, refresh_token),
                    };
                    self.store.set(renewed.clone());
                    guard.session = SessionState::Idle;
                    (waiters, Ok(renewed))
                }
                Err(reason) => {
                    self.store.clear();
                    guard.session = SessionState::Unauthenticated;
                    (waiters, Err(reason))
                }
            }
        };

        self.store.persist().await;

        match result {
            Ok(credential) => {
                info!(epoch, waiters = waiters.len(), "Session renewed");
                for waiter in waiters {
                    let _ = waiter.send(Ok(credential.clone()));
                }
            }
            Err(reason) => {
                warn!(epoch, waiters = waiters.len(), %reason, "Session renewal failed");
                let error = Error::session_terminated(reason.clone());
                for waiter in waiters {
                    let _ = waiter.send(Err(error.clone()));
                }
                self.sink.notify(Notice::SessionTerminated { reason });
            }
        }
    }

    async fn request_renewal(
        &self,
        refresh_token: &RefreshToken,
    ) -> std::result::Result<(AccessToken, RefreshToken), TerminationReason> {
        let body = RefreshRequest {
            refresh_token: refresh_token.as_str(),
        };

        let raw = self
            .transport
            .post_json(REFRESH, &body, self.refresh_timeout, TraceId::new())
            .await
            .map_err(|e| TerminationReason::RenewalUnreachable {
                message: e.to_string(),
            })?;

        if !(200..300).contains(&raw.status) {
            return Err(TerminationReason::RenewalRejected { status: raw.status });
        }

        let tokens: TokenResponse = serde_json::from_slice(&raw.body).map_err(|e| {
            TerminationReason::RenewalUnreachable {
                message: format!("malformed refresh response: {e}"),
            }
        })?;

        Ok((
            AccessToken::new(tokens.access_token),
            RefreshToken::new(tokens.refresh_token),
        ))
    }

    /// Tear the session down: clear the credential, reject every waiter
    /// with `reason`, and move to `Unauthenticated`.
    ///
    /// Waiters are rejected after storage is cleared. A renewal still in
    /// flight is discarded when it completes.
    pub(crate) async fn terminate(&self, reason: TerminationReason, notify: bool) {
        let waiters = {
            let mut guard = self.lock();
            self.store.clear();
            match std::mem::replace(&mut guard.session, SessionState::Unauthenticated) {
                SessionState::Refreshing { waiters, .. } => waiters,
                _ => VecDeque::new(),
            }
        };

        self.store.persist().await;

        info!(%reason, rejected = waiters.len(), "Session terminated");
        let error = Error::session_terminated(reason.clone());
        for waiter in waiters {
            let _ = waiter.send(Err(error.clone()));
        }

        if notify {
            self.sink.notify(Notice::SessionTerminated { reason });
        }
    }

    /// Install a credential from a successful login.
    ///
    /// Rejected while a renewal is in flight so the two cannot race.
    pub(crate) async fn install(&self, credential: Credential) -> Result<()> {
        {
            let mut guard = self.lock();
            if matches!(guard.session, SessionState::Refreshing { .. }) {
                return Err(Error::RenewalInProgress);
            }
            self.store.set(credential);
            guard.session = SessionState::Idle;
        }

        self.store.persist().await;
        Ok(())
    }

    /// Replace the active scope on the stored credential.
    pub(crate) async fn switch_scope(&self, scope: Option<ScopeId>) -> Result<Credential> {
        let updated = {
            let _guard = self.lock();
            let current = self.store.get().ok_or_else(|| {
                Error::session_terminated(TerminationReason::NotAuthenticated)
            })?;
            let updated = current.with_scope(scope);
            self.store.set(updated.clone());
            updated
        };

        self.store.persist().await;
        Ok(updated)
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("phase", &self.phase())
            .finish()
    }
}
