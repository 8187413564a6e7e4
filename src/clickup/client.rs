//! Authenticated HTTP client for the ClickUp API v2.
//!
//! Every call carries the decrypted personal token in the Authorization
//! header (ClickUp expects the bare token, no "Bearer " prefix). Listing
//! endpoints are paginated; pages are accumulated until the response
//! reports `last_page`. Failures are logged and returned to the caller;
//! there is no retry layer.

use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use url::Url;

use super::model::{ClickUpTask, ClickUpUser};
use super::{ClickUpError, TokenDecryptor, DEFAULT_BASE_URL};
use crate::types::Task;

/// One page of a team task listing.
#[derive(Debug, Deserialize)]
struct TaskPage {
    #[serde(default)]
    tasks: Vec<ClickUpTask>,
    #[serde(default)]
    last_page: bool,
}

/// Envelope around the current-user endpoint.
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    #[serde(default)]
    user: Option<ClickUpUser>,
}

/// Stateless API client: holds credentials and workspace identifiers,
/// never task data. One shared `reqwest::Client` serves all in-flight
/// requests.
#[derive(Clone)]
pub struct ClickUpClient {
    http: reqwest::Client,
    base_url: String,
    encrypted_token: String,
    team_id: String,
    space_id: String,
    decryptor: Arc<dyn TokenDecryptor>,
}

impl ClickUpClient {
    pub fn new(
        encrypted_token: &str,
        team_id: &str,
        space_id: &str,
        decryptor: Arc<dyn TokenDecryptor>,
    ) -> Result<Self, ClickUpError> {
        Self::with_base_url(DEFAULT_BASE_URL, encrypted_token, team_id, space_id, decryptor)
    }

    /// Build a client against a non-production endpoint.
    pub fn with_base_url(
        base_url: &str,
        encrypted_token: &str,
        team_id: &str,
        space_id: &str,
        decryptor: Arc<dyn TokenDecryptor>,
    ) -> Result<Self, ClickUpError> {
        let parsed = Url::parse(base_url).map_err(|err| {
            ClickUpError::InvalidArgument(format!("invalid base URL '{base_url}': {err}"))
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed.to_string().trim_end_matches('/').to_string(),
            encrypted_token: encrypted_token.to_string(),
            team_id: team_id.to_string(),
            space_id: space_id.to_string(),
            decryptor,
        })
    }

    /// Fetch one task by id.
    ///
    /// An empty id fails before any network call. An empty response body
    /// (ClickUp's shape for a missing task) maps to [`ClickUpError::TaskNotFound`].
    pub async fn get_task(
        &self,
        task_id: &str,
        use_custom_task_id: bool,
        include_subtasks: bool,
    ) -> Result<Task, ClickUpError> {
        if task_id.is_empty() {
            return Err(ClickUpError::InvalidArgument(
                "task id cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/task/{}", self.base_url, task_id);
        let request = self.authorized_request(Method::GET, &url)?.query(&[
            ("custom_task_ids", use_custom_task_id.to_string()),
            ("team_id", self.team_id.clone()),
            ("include_subtasks", include_subtasks.to_string()),
        ]);

        let response = self.execute(request, &url).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            log::error!("ClickUp returned an empty body for task {task_id}");
            return Err(ClickUpError::TaskNotFound(task_id.to_string()));
        }

        let record: ClickUpTask = serde_json::from_str(&body).map_err(|err| {
            log::error!("Could not deserialize task {task_id}: {err}");
            log::debug!("Offending body: {body}");
            ClickUpError::Json(err)
        })?;

        Ok(record.into())
    }

    /// Fetch the tasks with the given ids.
    ///
    /// The listing endpoint cannot filter by arbitrary id sets, so every
    /// page is fetched and the result is filtered client-side.
    pub async fn get_tasks(&self, task_ids: &[String]) -> Result<Vec<Task>, ClickUpError> {
        log::info!("Getting tasks with ids: {}", task_ids.join(", "));

        let extra = [("space_ids[]", self.space_id.clone())];
        let records = self.fetch_task_pages(&extra).await?;

        Ok(records
            .into_iter()
            .map(Task::from)
            .filter(|task| task_ids.contains(&task.id))
            .collect())
    }

    /// Fetch every open or in-progress task, optionally narrowed to one
    /// assignee (a ClickUp user id).
    pub async fn get_pending_tasks(&self, assignee: &str) -> Result<Vec<Task>, ClickUpError> {
        if assignee.is_empty() {
            log::info!("Start get pending tasks");
        } else {
            log::info!("Start get pending tasks with user id {assignee}");
        }

        let mut extra: Vec<(&str, String)> = vec![
            ("statuses[]", "open".to_string()),
            ("statuses[]", "in progress".to_string()),
            ("space_ids[]", self.space_id.clone()),
            ("include_closed", "false".to_string()),
        ];
        if !assignee.is_empty() {
            extra.push(("assignees[]", assignee.to_string()));
        }

        let records = self.fetch_task_pages(&extra).await?;
        Ok(records.into_iter().map(Task::from).collect())
    }

    /// Fetch the user the personal token belongs to.
    ///
    /// A response without a "user" key means "nobody" and is not an error.
    pub async fn get_authorized_user(&self) -> Result<Option<ClickUpUser>, ClickUpError> {
        log::info!("Start getting authorized user info");

        let url = format!("{}/user", self.base_url);
        let request = self.authorized_request(Method::GET, &url)?;
        let response = self.execute(request, &url).await?;

        let envelope: UserEnvelope = response.json().await.map_err(|err| {
            log::error!("Could not deserialize authorized user: {err}");
            log::debug!("Failing request: GET {url}");
            ClickUpError::Http(err)
        })?;

        if let Some(user) = &envelope.user {
            log::info!(
                "Authorized user: {}, {} with id {}",
                user.username,
                user.email,
                user.id
            );
        }
        Ok(envelope.user)
    }

    /// Probe the API with the configured credentials.
    ///
    /// Checks the space when one is configured, the current-user endpoint
    /// otherwise. Success is the only path returning `true`; every failure
    /// surfaces as an error.
    pub async fn test_connection(&self) -> Result<bool, ClickUpError> {
        let url = if self.space_id.is_empty() {
            format!("{}/user", self.base_url)
        } else {
            format!("{}/space/{}", self.base_url, self.space_id)
        };

        let request = self.authorized_request(Method::GET, &url)?;
        self.execute(request, &url).await?;
        Ok(true)
    }

    /// Move a task to "in progress" and add an assignee.
    ///
    /// ClickUp identifies assignees numerically, so a non-numeric id fails
    /// before any network I/O.
    pub async fn mark_task_as_open(
        &self,
        task_id: &str,
        assignee_id: &str,
    ) -> Result<(), ClickUpError> {
        let assignee: i64 = assignee_id.parse().map_err(|_| {
            log::error!(
                "Unable to open task '{task_id}': assignee id '{assignee_id}' is not numeric"
            );
            ClickUpError::InvalidArgument(format!("assignee id '{assignee_id}' is not numeric"))
        })?;

        let url = format!("{}/task/{}", self.base_url, task_id);
        let body = serde_json::json!({
            "status": "in progress",
            "assignees": { "add": [assignee] },
        });

        let request = self.authorized_request(Method::PUT, &url)?.json(&body);
        log::debug!("Request content: {body}");
        self.execute(request, &url).await?;
        Ok(())
    }

    /// Walk the team task listing until the API reports the last page.
    ///
    /// Termination relies on the server eventually setting `last_page`;
    /// there is no page cap.
    async fn fetch_task_pages(
        &self,
        extra_query: &[(&str, String)],
    ) -> Result<Vec<ClickUpTask>, ClickUpError> {
        let url = format!("{}/team/{}/task", self.base_url, self.team_id);
        let mut page: u32 = 0;
        let mut records = Vec::new();

        loop {
            let request = self
                .authorized_request(Method::GET, &url)?
                .query(&[("page", page.to_string())])
                .query(extra_query);

            let response = self.execute(request, &url).await?;
            let parsed: TaskPage = response.json().await.map_err(|err| {
                log::error!("Could not deserialize tasks: {err}");
                log::debug!("Failing request: GET {url} page {page}");
                ClickUpError::Http(err)
            })?;

            records.extend(parsed.tasks);
            if parsed.last_page {
                return Ok(records);
            }
            page += 1;
        }
    }

    /// Build a request with the freshly decrypted token attached.
    ///
    /// The plaintext lives only in the returned builder; nothing caches it.
    fn authorized_request(
        &self,
        method: Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder, ClickUpError> {
        let token = if self.encrypted_token.is_empty() {
            String::new()
        } else {
            self.decryptor.decrypt(&self.encrypted_token)?
        };

        log::debug!("Executing HTTP {method} request: {url}");
        Ok(self.http.request(method, url).header("Authorization", token))
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, ClickUpError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                log::error!("Unable to make call to '{url}': {err}");
                log::debug!("Transport error detail: {err:?}");
                return Err(ClickUpError::Http(err));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("Unable to make call to '{url}': HTTP {status}");
            log::debug!("Response body: {message}");
            return Err(ClickUpError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}
