use crate::domain_model::UserId;
use crate::domain_port::*;
use dashmap::DashMap;
use std::sync::Mutex;
use tokio::sync::watch;

const MAX_FAILED_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
struct Account {
    uid: UserId,
    password: String,
    failed_attempts: u32,
}

/// Email/password accounts kept in memory. Ids are derived from the email so
/// the same address always maps to the same principal.
#[derive(Debug)]
pub struct FakeIdentityProvider {
    accounts: DashMap<String, Account>,
    current: watch::Sender<Option<Principal>>,
    next_error: Mutex<Option<String>>,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            accounts: DashMap::new(),
            current,
            next_error: Mutex::new(None),
        }
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                uid: get_fake_id(email),
                password: password.to_string(),
                failed_attempts: 0,
            },
        );
        self
    }

    /// Makes the next sign-in or sign-up fail with a raw provider code.
    pub fn fail_next_with(&self, code: &str) {
        *self.next_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(code.to_string());
    }

    /// Simulates a change the app did not initiate, such as a token expiring
    /// or a sign-in from another window.
    pub fn push_identity(&self, principal: Option<Principal>) {
        self.current.send_replace(principal);
    }

    fn take_injected(&self) -> Option<IdentityError> {
        self.next_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .map(|code| IdentityError::from_code(&code))
    }
}

impl Default for FakeIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

pub fn get_fake_id(email: &str) -> UserId {
    UserId(
        uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, email.to_lowercase().as_bytes())
            .simple()
            .to_string(),
    )
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        if let Some(err) = self.take_injected() {
            return Err(err);
        }
        let key = email.to_lowercase();
        let mut account = self
            .accounts
            .get_mut(&key)
            .ok_or(IdentityError::InvalidCredentials)?;
        if account.failed_attempts >= MAX_FAILED_ATTEMPTS {
            return Err(IdentityError::RateLimited);
        }
        if account.password != password {
            account.failed_attempts += 1;
            return Err(IdentityError::InvalidCredentials);
        }
        account.failed_attempts = 0;
        let principal = Principal {
            uid: account.uid.clone(),
            email: key,
        };
        drop(account);
        self.current.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, IdentityError> {
        if let Some(err) = self.take_injected() {
            return Err(err);
        }
        let key = email.to_lowercase();
        if self.accounts.contains_key(&key) {
            return Err(IdentityError::EmailInUse);
        }
        let uid = get_fake_id(&key);
        self.accounts.insert(
            key.clone(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
                failed_attempts: 0,
            },
        );
        let principal = Principal { uid, email: key };
        self.current.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.current.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_checks_the_password() {
        let provider = FakeIdentityProvider::new().with_account("a@b.co", "secret1");
        assert_eq!(
            provider.sign_in("a@b.co", "wrong").await,
            Err(IdentityError::InvalidCredentials)
        );
        let principal = provider.sign_in("A@B.co", "secret1").await.unwrap();
        assert_eq!(principal.uid, get_fake_id("a@b.co"));
        assert_eq!(*provider.subscribe().borrow(), Some(principal));
    }

    #[tokio::test]
    async fn repeated_failures_are_rate_limited() {
        let provider = FakeIdentityProvider::new().with_account("a@b.co", "secret1");
        for _ in 0..MAX_FAILED_ATTEMPTS {
            let _ = provider.sign_in("a@b.co", "nope").await;
        }
        assert_eq!(
            provider.sign_in("a@b.co", "secret1").await,
            Err(IdentityError::RateLimited)
        );
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_email_in_use() {
        let provider = FakeIdentityProvider::new().with_account("a@b.co", "secret1");
        assert_eq!(
            provider.sign_up("a@b.co", "secret2").await,
            Err(IdentityError::EmailInUse)
        );
    }

    #[tokio::test]
    async fn injected_codes_are_translated() {
        let provider = FakeIdentityProvider::new();
        provider.fail_next_with("auth/too-many-requests");
        assert_eq!(
            provider.sign_up("x@y.co", "secret1").await,
            Err(IdentityError::RateLimited)
        );
    }
}
