//! `BackendApi` over HTTP with JSON bodies.

use crate::domain_model::*;
use crate::domain_port::*;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status {0}")]
    Status(StatusCode),
    #[error("empty body")]
    Empty,
}

pub struct HttpBackendApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackendApi {
    /// `base_url` is the API root, e.g. `http://localhost:3000/api`.
    pub fn try_new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        Ok(resp.json().await?)
    }

    /// For endpoints whose body only signals success. A JSON `null` counts as
    /// no answer.
    async fn ack(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let body: serde_json::Value = self.fetch(request).await?;
        if body.is_null() {
            return Err(ApiError::Empty);
        }
        Ok(())
    }

    fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.http.put(self.url(path)).json(body)
    }

    fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.http.post(self.url(path)).json(body)
    }
}

fn swallow<T>(what: &str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("{what}: {e}");
            None
        }
    }
}

#[async_trait::async_trait]
impl BackendApi for HttpBackendApi {
    async fn get_profile(&self, user: &UserId) -> Option<Profile> {
        let req = self.http.get(self.url(&format!("/users/{user}")));
        swallow("get profile", self.fetch(req).await)
    }

    async fn register_profile(&self, profile: &NewProfile) -> Option<()> {
        let req = self.post_json("/users", profile);
        swallow("register profile", self.ack(req).await)
    }

    async fn add_user_task(&self, user: &UserId, task: &Task) -> Option<()> {
        let mut task = task.clone();
        task.user_id = Some(user.clone());
        let req = self.put_json(&format!("/users/{user}"), &task);
        swallow("add task", self.ack(req).await)
    }

    async fn delete_user_task(&self, user: &UserId, task: &Task) -> Option<()> {
        let req = self
            .http
            .delete(self.url(&format!("/users/deletetask/{user}")))
            .json(task);
        swallow("delete task", self.ack(req).await)
    }

    async fn list_basic_users(&self) -> Option<Vec<BasicUser>> {
        let req = self.http.get(self.url("/users")).query(&[("type", "basic")]);
        swallow("list users", self.fetch(req).await)
    }

    async fn request_group(&self, request: &JoinRequestInput) -> Option<()> {
        let req = self.post_json("/users/requestGroup", request);
        swallow("request group", self.ack(req).await)
    }

    async fn get_members_task_info(&self, members: &[UserId]) -> Option<Vec<MemberTaskInfo>> {
        #[derive(Serialize)]
        struct Members<'a> {
            members: &'a [UserId],
        }

        let req = self.post_json("/users/getUsersTaskInfo", &Members { members });
        swallow("member task info", self.fetch(req).await)
    }

    async fn resolve_pending(&self, decision: Decision, batch: &ResolveBatch) -> Option<()> {
        let req = self
            .put_json("/groups/addUser", batch)
            .query(&[("type", decision.as_query())]);
        swallow("resolve invites", self.ack(req).await)
    }

    async fn get_group(&self, group: &GroupId) -> Option<Group> {
        let req = self.http.get(self.url(&format!("/groups/getGroup/{group}")));
        swallow("get group", self.fetch(req).await)
    }

    async fn list_groups(&self, scope: GroupScope, user: &UserId) -> Option<Vec<GroupSummary>> {
        let req = self
            .http
            .get(self.url("/groups/getGroups"))
            .query(&[("type", scope.as_query()), ("userId", user.0.as_str())]);
        swallow("list groups", self.fetch(req).await)
    }

    async fn create_group(&self, group: &NewGroup) -> Option<GroupSummary> {
        let req = self.post_json("/groups/createGroup", group);
        swallow("create group", self.fetch(req).await)
    }

    async fn add_group_task(&self, group: &GroupId, task: &Task) -> Option<Task> {
        let req = self.put_json(&format!("/groups/addTask/{group}"), task);
        swallow("add group task", self.fetch(req).await)
    }

    async fn delete_group_task(&self, group: &GroupId, task: &TaskKey) -> Option<()> {
        let req = self.post_json(&format!("/groups/deleteTask/{group}"), task);
        swallow("delete group task", self.ack(req).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalised() {
        let api = HttpBackendApi::try_new("http://localhost:3000/api/").unwrap();
        assert_eq!(api.url("/users/u1"), "http://localhost:3000/api/users/u1");
    }

    #[tokio::test]
    async fn unreachable_backend_yields_no_data() {
        // nothing listens on port 9 (discard) locally
        let api = HttpBackendApi::try_new("http://127.0.0.1:9/api").unwrap();
        assert_eq!(api.get_profile(&UserId("u1".into())).await, None);
        assert_eq!(api.list_groups(GroupScope::User, &UserId("u1".into())).await, None);
    }

    #[test]
    fn resolve_body_shape() {
        let batch = ResolveBatch {
            gi: vec![GroupInvite {
                group_id: GroupId("g1".into()),
                group_name: "One".into(),
                selected: true,
            }],
            ui: Default::default(),
            user_id: UserId("u1".into()),
        };
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["gi"][0]["groupId"], "g1");
        assert!(json["ui"].as_object().unwrap().is_empty());
    }
}
