use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("not signed in")]
    NotSignedIn,
    #[error("group was not created")]
    NotCreated,
    #[error("join request was not sent")]
    RequestFailed,
}

#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    pub name: String,
    pub description: String,
    pub kind: GroupKind,
    /// Users to invite; the creator is the owner and is never invited.
    pub invitees: Vec<UserId>,
}

/// Group directory for the signed-in user. Listings degrade to empty when the
/// backend has nothing to say.
#[async_trait::async_trait]
pub trait GroupService: Send + Sync {
    async fn create_group(&self, input: CreateGroupInput) -> Result<GroupSummary, GroupError>;
    async fn list_user_groups(&self) -> Vec<GroupSummary>;
    /// Invite-only groups the user is not in. Private groups never appear.
    async fn list_discoverable_groups(&self) -> Vec<DiscoverableGroup>;
    async fn list_inviteable_users(&self) -> Vec<BasicUser>;
    async fn request_to_join(&self, group: &DiscoverableGroup) -> Result<(), GroupError>;
}
