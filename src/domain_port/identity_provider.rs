use crate::domain_model::UserId;
use tokio::sync::watch;

/// The signed-in identity, as opposed to the profile the backend keeps for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: UserId,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("rate limited")]
    RateLimited,
    #[error("email already in use")]
    EmailInUse,
    #[error("identity provider error: {0}")]
    Unknown(String),
}

impl IdentityError {
    /// Maps a provider error code onto the four kinds the views know about.
    /// Understands both the `auth/...` client codes and the upper-case REST
    /// codes, which may carry a trailing explanation.
    pub fn from_code(code: &str) -> Self {
        let code = code.split([' ', ':']).next().unwrap_or(code);
        match code {
            "auth/invalid-credential"
            | "auth/wrong-password"
            | "auth/user-not-found"
            | "auth/invalid-email"
            | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_PASSWORD"
            | "EMAIL_NOT_FOUND"
            | "INVALID_EMAIL" => IdentityError::InvalidCredentials,
            "auth/too-many-requests" | "TOO_MANY_ATTEMPTS_TRY_LATER" => IdentityError::RateLimited,
            "auth/email-already-in-use" | "EMAIL_EXISTS" => IdentityError::EmailInUse,
            other => IdentityError::Unknown(other.to_string()),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            IdentityError::InvalidCredentials => "Invalid email or password. Please try again.",
            IdentityError::RateLimited => concat!(
                "Access temporarily disabled due to too many failed login attempts. ",
                "Please reset your password or try again later."
            ),
            IdentityError::EmailInUse => "Email already in use. Please try a different email.",
            IdentityError::Unknown(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, IdentityError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, IdentityError>;
    async fn sign_out(&self) -> Result<(), IdentityError>;
    /// Current principal, updated on every sign-in and sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_provider_codes() {
        use IdentityError::*;

        assert_eq!(IdentityError::from_code("auth/wrong-password"), InvalidCredentials);
        assert_eq!(IdentityError::from_code("INVALID_LOGIN_CREDENTIALS"), InvalidCredentials);
        assert_eq!(
            IdentityError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER : Access temporarily disabled"),
            RateLimited
        );
        assert_eq!(IdentityError::from_code("EMAIL_EXISTS"), EmailInUse);
        assert_eq!(IdentityError::from_code("auth/email-already-in-use"), EmailInUse);
        assert_eq!(
            IdentityError::from_code("OPERATION_NOT_ALLOWED"),
            IdentityError::Unknown("OPERATION_NOT_ALLOWED".into())
        );
    }
}
