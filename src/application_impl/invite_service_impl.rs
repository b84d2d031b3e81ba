use crate::application_impl::SessionManager;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use tracing::{info, warn};

/// Resolves invites and join requests in one all-or-nothing request, then
/// refetches the profile so the lists match the backend.
pub struct RealInviteService {
    session: Arc<SessionManager>,
    backend: Arc<dyn BackendApi>,
}

impl RealInviteService {
    pub fn new(session: Arc<SessionManager>, backend: Arc<dyn BackendApi>) -> Self {
        Self { session, backend }
    }
}

#[async_trait::async_trait]
impl InviteService for RealInviteService {
    fn pending(&self) -> PendingItems {
        self.session
            .profile()
            .map(|p| PendingItems::from_profile(&p))
            .unwrap_or_default()
    }

    async fn resolve(
        &self,
        decision: Decision,
        pending: &mut PendingItems,
    ) -> Result<ResolveOutcome, InviteError> {
        if !pending.has_selection() {
            return Ok(ResolveOutcome::NothingSelected);
        }
        let user = self.session.user_id().ok_or(InviteError::NotSignedIn)?;

        let batch = ResolveBatch {
            gi: pending.selected_invites(),
            ui: pending.selected_requests(),
            user_id: user,
        };
        let invites = batch.gi.len();
        let requests = batch.ui.values().map(Vec::len).sum();

        if self.backend.resolve_pending(decision, &batch).await.is_none() {
            warn!(%decision, invites, requests, "resolve failed, nothing changed");
            return Err(InviteError::NotResolved);
        }

        pending.remove_selected();
        self.session.update_profile(|profile| {
            profile
                .group_invites
                .retain(|i| !batch.gi.iter().any(|r| r.group_id == i.group_id));
            for (group, resolved) in &batch.ui {
                if let Some(left) = profile.user_invites.get_mut(group) {
                    left.retain(|r| !resolved.iter().any(|x| x.user_id == r.user_id));
                }
            }
            profile.user_invites.retain(|_, left| !left.is_empty());
        });
        info!(%decision, invites, requests, "resolved");
        self.session.refresh_profile().await;

        Ok(ResolveOutcome::Resolved { invites, requests })
    }
}
