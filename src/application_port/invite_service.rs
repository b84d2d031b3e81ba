use crate::domain_model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    NothingSelected,
    Resolved { invites: usize, requests: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("invites were not resolved")]
    NotResolved,
}

#[async_trait::async_trait]
pub trait InviteService: Send + Sync {
    /// Working copy of the signed-in user's invites and join requests.
    fn pending(&self) -> PendingItems;
    /// Accepts or rejects every selected entry of `pending` in one request.
    /// `pending` is only modified once the backend has answered.
    async fn resolve(
        &self,
        decision: Decision,
        pending: &mut PendingItems,
    ) -> Result<ResolveOutcome, InviteError>;
}
