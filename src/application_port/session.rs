use crate::domain_model::*;
use crate::domain_port::{IdentityError, Principal};

/// Where the signed-in session stands.
///
/// `Unauthenticated -> Authenticating -> LoadingProfile -> Ready`, and back to
/// `Unauthenticated` on sign-out or when the profile cannot be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    LoadingProfile { principal: Principal },
    Ready { principal: Principal, profile: Profile },
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready { .. })
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionState::Ready { profile, .. } => Some(profile),
            _ => None,
        }
    }
}

/// Why the last attempt ended in `Unauthenticated`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    Identity(IdentityError),
    /// The identity was valid but its profile never loaded.
    ProfileUnavailable { uid: UserId },
    RegistrationFailed,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("profile could not be loaded")]
    ProfileUnavailable,
    #[error("failed to save your details")]
    RegistrationFailed,
    #[error("identity changed before the profile arrived")]
    Superseded,
}
