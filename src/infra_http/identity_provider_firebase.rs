use crate::domain_model::UserId;
use crate::domain_port::*;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

/// Email/password accounts through the identity toolkit REST API.
pub struct FirebaseIdentityProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    current: watch::Sender<Option<Principal>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentityProvider {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            current,
        }
    }

    async fn password_call(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<Principal, IdentityError> {
        let resp = self
            .http
            .post(format!("{}/v1/accounts:{action}", self.endpoint))
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| IdentityError::Unknown(e.to_string()))?;

        if !resp.status().is_success() {
            let err: ErrorResponse = resp
                .json()
                .await
                .map_err(|e| IdentityError::Unknown(e.to_string()))?;
            debug!("identity {action} rejected: {}", err.error.message);
            return Err(IdentityError::from_code(&err.error.message));
        }

        let account: AccountResponse = resp
            .json()
            .await
            .map_err(|e| IdentityError::Unknown(e.to_string()))?;
        let principal = Principal {
            uid: UserId(account.local_id),
            email: account.email,
        };
        info!(uid = %principal.uid, "identity {action} succeeded");
        self.current.send_replace(Some(principal.clone()));
        Ok(principal)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        self.password_call("signUp", email, password).await
    }

    // Tokens are not persisted, so forgetting the principal is enough.
    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.current.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.current.subscribe()
    }
}
