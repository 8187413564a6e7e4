//! The synchronous façade the host drives.
//!
//! The host's issue-panel interface is synchronous, so every operation
//! here blocks on the underlying HTTP call via an owned tokio runtime.
//! `connect` is the one fire-and-forget call: it starts the
//! authorized-user fetch in the background and returns immediately, and
//! assignee-dependent operations degrade gracefully until that fetch
//! lands. Only this façade ever writes the authorized-user slot.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::runtime::Runtime;

use crate::branch;
use crate::clickup::{ClickUpClient, ClickUpError, ClickUpUser, TokenDecryptor};
use crate::config::{self, TrackerConfiguration};
use crate::types::Task;

pub const EXTENSION_NAME: &str = "ClickUp";

pub struct ClickUpExtension {
    config: TrackerConfiguration,
    client: ClickUpClient,
    runtime: Runtime,
    authorized_user: Arc<RwLock<Option<ClickUpUser>>>,
}

impl ClickUpExtension {
    /// Build the extension from host-stored parameters, reconciling them
    /// against the current default schema first.
    pub fn from_stored(
        stored: Option<TrackerConfiguration>,
        decryptor: Arc<dyn TokenDecryptor>,
    ) -> Result<Self, ClickUpError> {
        let reconciled = config::reconcile(stored, config::default_parameters());
        Self::new(reconciled, decryptor)
    }

    /// Build the extension from an already-reconciled configuration.
    pub fn new(
        config: TrackerConfiguration,
        decryptor: Arc<dyn TokenDecryptor>,
    ) -> Result<Self, ClickUpError> {
        let client = ClickUpClient::new(
            config.value_of(config::PERSONAL_API_KEY),
            config.value_of(config::TEAM_ID),
            config.value_of(config::SPACE_ID),
            decryptor,
        )?;
        Self::with_client(config, client)
    }

    /// Build against a specific client. Tests point this at a local server.
    pub fn with_client(
        config: TrackerConfiguration,
        client: ClickUpClient,
    ) -> Result<Self, ClickUpError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            config,
            client,
            runtime,
            authorized_user: Arc::new(RwLock::new(None)),
        })
    }

    pub fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    /// Start the authorized-user fetch without blocking the caller.
    ///
    /// The slot becomes visible once the background fetch completes; until
    /// then assignee-dependent operations see "not authenticated". A failed
    /// fetch is logged and leaves the slot untouched.
    pub fn connect(&self) {
        log::info!("{EXTENSION_NAME} extension is connecting...");

        let client = self.client.clone();
        let slot = Arc::clone(&self.authorized_user);
        self.runtime.spawn(async move {
            match client.get_authorized_user().await {
                Ok(user) => *slot.write() = user,
                Err(err) => log::error!("Could not fetch the authorized user: {err}"),
            }
        });
    }

    pub fn disconnect(&self) {
        log::info!("{EXTENSION_NAME} extension is disconnecting...");
        *self.authorized_user.write() = None;
    }

    /// The user the session is authenticated as, once `connect` resolves.
    pub fn authorized_user(&self) -> Option<ClickUpUser> {
        self.authorized_user.read().clone()
    }

    pub fn test_connection(&self) -> Result<bool, ClickUpError> {
        self.runtime.block_on(self.client.test_connection())
    }

    pub fn load_tasks(&self, task_ids: &[String]) -> Result<Vec<Task>, ClickUpError> {
        self.runtime.block_on(self.client.get_tasks(task_ids))
    }

    pub fn pending_tasks(&self) -> Result<Vec<Task>, ClickUpError> {
        self.runtime.block_on(self.client.get_pending_tasks(""))
    }

    /// Pending tasks for one assignee (an email address).
    ///
    /// Requires a connected user whose email equals `assignee` exactly;
    /// otherwise this logs an error and returns an empty list. The tracker
    /// itself is queried by user id, not by the email the host passes in.
    pub fn pending_tasks_for(&self, assignee: &str) -> Result<Vec<Task>, ClickUpError> {
        match self.authorized_user() {
            Some(user) if user.email == assignee => {
                log::info!("Start get pending tasks with assignee {assignee}");
                self.runtime
                    .block_on(self.client.get_pending_tasks(&user.id))
            }
            _ => {
                log::error!("No authorized user found for {assignee}.");
                Ok(Vec::new())
            }
        }
    }

    /// Move a task to "in progress" and assign the connected user to it.
    ///
    /// Without a connected user this logs an error and does nothing.
    pub fn mark_task_as_open(&self, task_id: &str, assignee: &str) -> Result<(), ClickUpError> {
        match self.authorized_user() {
            Some(user) => {
                log::info!(
                    "Changing status of task {task_id} to 'in progress' and assigning {assignee}"
                );
                self.runtime
                    .block_on(self.client.mark_task_as_open(task_id, &user.id))
            }
            None => {
                log::error!("No authorized user found for {assignee}.");
                Ok(())
            }
        }
    }

    /// Resolve the task a branch refers to.
    ///
    /// Branches that do not encode a task id resolve to `Task::default()`
    /// without touching the network.
    pub fn task_for_branch(&self, full_branch_name: &str) -> Result<Task, ClickUpError> {
        let task_id = self.task_id_for(full_branch_name);
        if task_id.is_empty() {
            return Ok(Task::default());
        }

        self.runtime
            .block_on(self.client.get_task(&task_id, false, false))
    }

    /// Resolve a batch of branches, one independent fetch per branch.
    pub fn tasks_for_branches(
        &self,
        full_branch_names: &[String],
    ) -> Result<HashMap<String, Task>, ClickUpError> {
        let mut result = HashMap::with_capacity(full_branch_names.len());
        for full_branch_name in full_branch_names {
            let task = self.task_for_branch(full_branch_name)?;
            result.insert(full_branch_name.clone(), task);
        }
        Ok(result)
    }

    /// Open a task in the ClickUp desktop app or the default browser.
    ///
    /// A machine with no `clickup://` handler logs the failure and moves
    /// on; any other failure is logged and surfaced.
    pub fn open_task_externally(&self, task_id: &str) -> Result<(), ClickUpError> {
        let target = format!("clickup://t/{task_id}");
        log::info!("Attempting to open task {task_id} in the ClickUp desktop app or default browser");

        if let Err(err) = open::that(&target) {
            if err.kind() == std::io::ErrorKind::NotFound {
                log::error!("{err}");
                return Ok(());
            }
            log::error!("Could not open task with id {task_id}: {err}");
            log::debug!("Failing target: {target}");
            return Err(ClickUpError::Io(err));
        }
        Ok(())
    }

    fn task_id_for(&self, full_branch_name: &str) -> String {
        let short_name = branch::short_branch_name(full_branch_name);
        let prefix = self.config.value_of(config::BRANCH_PREFIX);
        branch::task_id_for_branch(short_name, prefix).to_string()
    }
}
