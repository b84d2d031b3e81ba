use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_http::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::Settings;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEMO_EMAIL: &str = "demo@groupcal.dev";
pub const DEMO_PASSWORD: &str = "demo-pass";

/// Everything a front end needs, wired from settings.
pub struct Client {
    pub session: Arc<SessionManager>,
    pub tasks: Arc<dyn TaskService>,
    pub groups: Arc<dyn GroupService>,
    pub invites: Arc<dyn InviteService>,
    pub group_calendar: Arc<dyn GroupCalendarService>,
    listener_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Client {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let backend: Arc<dyn BackendApi> = match settings.api.backend.as_str() {
            "fake" => {
                let fake = Arc::new(FakeBackendApi::new());
                seed_demo_profile(&fake);
                fake
            }
            "http" => Arc::new(HttpBackendApi::try_new(&settings.api.base_url)?),
            other => return Err(anyhow::anyhow!("Unknown api backend: {}", other)),
        };

        let identity: Arc<dyn IdentityProvider> = match settings.identity.backend.as_str() {
            "fake" => Arc::new(FakeIdentityProvider::new().with_account(DEMO_EMAIL, DEMO_PASSWORD)),
            "firebase" => {
                if settings.identity.api_key.is_empty() {
                    return Err(anyhow::anyhow!("identity.api_key is required for firebase"));
                }
                let endpoint = settings
                    .identity
                    .endpoint
                    .as_deref()
                    .unwrap_or(DEFAULT_IDENTITY_ENDPOINT);
                Arc::new(FirebaseIdentityProvider::new(endpoint, &settings.identity.api_key))
            }
            other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
        };

        let config = SessionConfig {
            profile_retries: settings.session.profile_retries,
            retry_backoff: settings.session.retry_backoff(),
        };
        info!(
            api = %settings.api.backend,
            identity = %settings.identity.backend,
            "client configured"
        );
        Ok(Self::from_parts(identity, backend, config))
    }

    /// Wires the services over the given adapters and starts following
    /// identity changes. Must be called inside a tokio runtime.
    pub fn from_parts(
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn BackendApi>,
        config: SessionConfig,
    ) -> Self {
        let session = Arc::new(SessionManager::new(identity, backend.clone(), config));

        let tasks: Arc<dyn TaskService> =
            Arc::new(RealTaskService::new(session.clone(), backend.clone()));
        let groups: Arc<dyn GroupService> =
            Arc::new(RealGroupService::new(session.clone(), backend.clone()));
        let invites: Arc<dyn InviteService> =
            Arc::new(RealInviteService::new(session.clone(), backend.clone()));
        let group_calendar: Arc<dyn GroupCalendarService> =
            Arc::new(RealGroupCalendarService::new(session.clone(), backend));

        let cancel = CancellationToken::new();
        let listener_handle = tokio::spawn(session.clone().run(cancel.clone()));

        Self {
            session,
            tasks,
            groups,
            invites,
            group_calendar,
            listener_handle: Mutex::new(Some(listener_handle)),
            cancel,
        }
    }

    pub async fn shutdown(&self) {
        debug!("client shutting down...");
        self.cancel.cancel();

        let handle = self
            .listener_handle
            .lock()
            .ok()
            .and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("session listener ended abnormally: {e}");
            }
        }
    }
}

fn seed_demo_profile(backend: &FakeBackendApi) {
    backend.insert_profile(Profile {
        user_id: get_fake_id(DEMO_EMAIL),
        username: "demo".to_string(),
        name: "Demo User".to_string(),
        age: None,
        phone_number: None,
        tasks: vec![],
        group_invites: vec![],
        user_invites: BTreeMap::new(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::*;

    fn fake_settings() -> Settings {
        Settings {
            api: Api {
                backend: "fake".into(),
                base_url: "http://localhost:3000/api".into(),
            },
            identity: Identity {
                backend: "fake".into(),
                api_key: String::new(),
                endpoint: None,
            },
            session: Session {
                profile_retries: 0,
                retry_backoff_ms: 1,
            },
            log: Log {
                filter: "info".into(),
            },
        }
    }

    #[tokio::test]
    async fn fake_client_signs_in_the_demo_account() {
        let client = Client::try_new(&fake_settings()).await.unwrap();
        let profile = client
            .session
            .sign_in(&SignInForm {
                email: DEMO_EMAIL.into(),
                password: DEMO_PASSWORD.into(),
            })
            .await
            .unwrap();
        assert_eq!(profile.username, "demo");
        assert!(client.tasks.today().is_empty());
        client.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_backends_are_rejected() {
        let mut settings = fake_settings();
        settings.api.backend = "grpc".into();
        assert!(Client::try_new(&settings).await.is_err());

        let mut settings = fake_settings();
        settings.identity.backend = "firebase".into();
        assert!(Client::try_new(&settings).await.is_err());
    }
}
