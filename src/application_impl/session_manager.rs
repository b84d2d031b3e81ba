use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Extra profile fetch attempts after the first one fails.
    pub profile_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_backoff: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    principal: Option<Principal>,
    profile: Option<Profile>,
    tasks: TaskCache,
    active_group: Option<GroupId>,
    last_failure: Option<SessionFailure>,
    /// Set while this process drives an identity change itself, so the
    /// listener does not start a competing load for the same event.
    local_change: bool,
}

/// Owns the signed-in principal, its cached profile, the personal task cache
/// and the active-group pointer. Views get it by reference; nothing here is
/// global.
///
/// Every identity change bumps `epoch`. A profile fetch remembers the epoch it
/// started under and drops its result if the epoch moved on meanwhile.
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    backend: Arc<dyn BackendApi>,
    config: SessionConfig,
    epoch: AtomicU64,
    inner: Mutex<Inner>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn BackendApi>,
        config: SessionConfig,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            identity,
            backend,
            config,
            epoch: AtomicU64::new(0),
            inner: Mutex::new(Inner::default()),
            state,
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: SessionState) {
        debug!(?state, "session state");
        self.state.send_replace(state);
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.inner().principal.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.inner().principal.as_ref().map(|p| p.uid.clone())
    }

    pub fn profile(&self) -> Option<Profile> {
        self.inner().profile.clone()
    }

    pub fn last_failure(&self) -> Option<SessionFailure> {
        self.inner().last_failure.clone()
    }

    pub async fn sign_in(&self, form: &SignInForm) -> Result<Profile, SessionError> {
        validate_sign_in(form)?;
        self.begin_local_change();
        let principal = match self.identity.sign_in(form.email.trim(), &form.password).await {
            Ok(principal) => principal,
            Err(e) => return Err(self.identity_failed(e)),
        };
        self.load_profile_for(Some(principal))
            .await?
            .ok_or(SessionError::ProfileUnavailable)
    }

    /// Creates the identity, registers the profile record for it and signs in.
    pub async fn sign_up(&self, form: &RegistrationForm) -> Result<Profile, SessionError> {
        let registration = validate_registration(form)?;
        self.begin_local_change();
        let principal = match self.identity.sign_up(form.email.trim(), &form.password).await {
            Ok(principal) => principal,
            Err(e) => return Err(self.identity_failed(e)),
        };

        let record = NewProfile {
            user_id: principal.uid.clone(),
            username: registration.username,
            name: registration.name,
            age: registration.age,
            phone_number: registration.phone_number,
        };
        if self.backend.register_profile(&record).await.is_none() {
            warn!(uid = %principal.uid, "profile registration failed");
            if let Err(e) = self.identity.sign_out().await {
                warn!(uid = %principal.uid, "sign-out after failed registration: {e}");
            }
            self.teardown(Some(SessionFailure::RegistrationFailed));
            return Err(SessionError::RegistrationFailed);
        }

        self.load_profile_for(Some(principal))
            .await?
            .ok_or(SessionError::ProfileUnavailable)
    }

    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.inner().local_change = true;
        if let Err(e) = self.identity.sign_out().await {
            self.inner().local_change = false;
            return Err(e.into());
        }
        self.load_profile_for(None).await?;
        Ok(())
    }

    /// Reacts to the identity provider reporting `principal`.
    ///
    /// Returns `Superseded` when another identity change happened while the
    /// profile was loading; the late result is dropped in that case.
    pub async fn load_profile_for(
        &self,
        principal: Option<Principal>,
    ) -> Result<Option<Profile>, SessionError> {
        let epoch = {
            let mut inner = self.inner();
            let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            match &principal {
                None => self.reset(&mut inner, None),
                Some(principal) => {
                    inner.principal = Some(principal.clone());
                    inner.profile = None;
                    inner.tasks.clear();
                    inner.active_group = None;
                    inner.last_failure = None;
                    inner.local_change = false;
                    self.publish(SessionState::LoadingProfile {
                        principal: principal.clone(),
                    });
                }
            }
            epoch
        };
        let Some(principal) = principal else {
            info!("signed out");
            return Ok(None);
        };

        let fetched = self.fetch_profile(&principal.uid, epoch).await;

        let mut inner = self.inner();
        if !self.is_current(epoch) {
            debug!(uid = %principal.uid, "discarding stale profile");
            return Err(SessionError::Superseded);
        }
        match fetched {
            Some(profile) => {
                inner.tasks.reconcile(profile.tasks.clone());
                inner.profile = Some(profile.clone());
                info!(uid = %principal.uid, username = %profile.username, "session ready");
                self.publish(SessionState::Ready {
                    principal,
                    profile: profile.clone(),
                });
                Ok(Some(profile))
            }
            None => {
                warn!(uid = %principal.uid, "giving up on profile");
                let failure = SessionFailure::ProfileUnavailable { uid: principal.uid };
                self.reset(&mut inner, Some(failure));
                Err(SessionError::ProfileUnavailable)
            }
        }
    }

    /// Refetches the profile of the current principal. Keeps the cached
    /// profile when the fetch fails.
    pub async fn refresh_profile(&self) -> Option<Profile> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let principal = self.principal()?;
        let profile = self.backend.get_profile(&principal.uid).await?;

        let mut inner = self.inner();
        if !self.is_current(epoch) {
            debug!(uid = %principal.uid, "discarding stale refresh");
            return None;
        }
        inner.tasks.reconcile(profile.tasks.clone());
        inner.profile = Some(profile.clone());
        self.publish(SessionState::Ready {
            principal,
            profile: profile.clone(),
        });
        Some(profile)
    }

    /// Applies a local edit to the cached profile, e.g. after resolving
    /// invites.
    pub fn update_profile(&self, edit: impl FnOnce(&mut Profile)) {
        let mut inner = self.inner();
        let Some(profile) = inner.profile.as_mut() else {
            return;
        };
        edit(profile);
        let profile = profile.clone();
        if let Some(principal) = inner.principal.clone() {
            self.publish(SessionState::Ready { principal, profile });
        }
    }

    pub fn with_tasks<R>(&self, f: impl FnOnce(&mut TaskCache) -> R) -> R {
        f(&mut self.inner().tasks)
    }

    /// Points the group calendar at a group. Only groups picked from the
    /// user's own list qualify.
    pub fn open_group(&self, selection: &GroupSelection) -> bool {
        match selection {
            GroupSelection::Member(summary) => {
                self.inner().active_group = Some(summary.id.clone());
                true
            }
            GroupSelection::Discoverable(_) => false,
        }
    }

    pub fn active_group(&self) -> Option<GroupId> {
        self.inner().active_group.clone()
    }

    /// Follows identity changes the app did not start itself until `cancel`
    /// fires. Adopts whatever the provider already holds on start; changes to
    /// the principal already held are ignored.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut identities = self.identity.subscribe();
        loop {
            let principal = identities.borrow_and_update().clone();
            self.follow(principal);

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = identities.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("session listener stopped");
    }

    fn follow(self: &Arc<Self>, principal: Option<Principal>) {
        {
            let inner = self.inner();
            if inner.local_change || principal == inner.principal {
                return;
            }
        }
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.load_profile_for(principal).await {
                debug!("identity change: {e}");
            }
        });
    }

    async fn fetch_profile(&self, uid: &UserId, epoch: u64) -> Option<Profile> {
        let mut delay = self.config.retry_backoff;
        for attempt in 0..=self.config.profile_retries {
            if attempt > 0 {
                warn!(%uid, attempt, "profile fetch failed, retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            if !self.is_current(epoch) {
                return None;
            }
            if let Some(profile) = self.backend.get_profile(uid).await {
                return Some(profile);
            }
        }
        None
    }

    fn begin_local_change(&self) {
        self.inner().local_change = true;
        self.publish(SessionState::Authenticating);
    }

    /// A failed attempt leaves a principal that is already held in place;
    /// the provider still reports it.
    fn identity_failed(&self, error: IdentityError) -> SessionError {
        let failure = SessionFailure::Identity(error.clone());
        let mut inner = self.inner();
        inner.local_change = false;
        let restored = match (&inner.principal, &inner.profile) {
            (Some(principal), Some(profile)) => Some(SessionState::Ready {
                principal: principal.clone(),
                profile: profile.clone(),
            }),
            (Some(principal), None) => Some(SessionState::LoadingProfile {
                principal: principal.clone(),
            }),
            (None, _) => None,
        };
        match restored {
            Some(state) => {
                inner.last_failure = Some(failure);
                self.publish(state);
            }
            None => {
                self.epoch.fetch_add(1, Ordering::SeqCst);
                self.reset(&mut inner, Some(failure));
            }
        }
        SessionError::Identity(error)
    }

    /// Ends the session and invalidates every profile fetch in flight.
    fn teardown(&self, failure: Option<SessionFailure>) {
        let mut inner = self.inner();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.reset(&mut inner, failure);
    }

    fn reset(&self, inner: &mut Inner, failure: Option<SessionFailure>) {
        inner.principal = None;
        inner.profile = None;
        inner.tasks.clear();
        inner.active_group = None;
        inner.last_failure = failure;
        inner.local_change = false;
        self.publish(SessionState::Unauthenticated);
    }
}
