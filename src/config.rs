//! Host-persisted configuration: the parameter schema and its
//! reconciliation against stored values.
//!
//! The host stores configuration as a flat list of named parameters. On
//! every session start the stored list is reconciled against the current
//! default schema so that schema upgrades (new parameters, changed kinds)
//! never lose user-entered values for parameters that still exist.

use serde::{Deserialize, Serialize};

/// Parameter names the extension understands.
pub const PERSONAL_API_KEY: &str = "Personal API Key";
pub const BRANCH_PREFIX: &str = "Branch prefix";
pub const TEAM_ID: &str = "Team Id";
pub const SPACE_ID: &str = "Space Id";

/// How the host links tasks to version-control objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkingMode {
    #[default]
    TaskOnBranch,
    TaskOnChangeset,
}

/// Input widget and handling hint for a configuration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    Password,
    BranchPrefix,
    Text,
}

/// One named configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigParameter {
    pub name: String,
    pub value: String,
    pub kind: ParameterKind,
    /// Whether the host must mask the value and encrypt it at rest.
    pub is_sensitive: bool,
}

impl ConfigParameter {
    pub fn new(name: &str, value: &str, kind: ParameterKind, is_sensitive: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            kind,
            is_sensitive,
        }
    }
}

/// The extension's configuration for one session.
///
/// Constructed once via [`reconcile`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfiguration {
    pub working_mode: WorkingMode,
    pub parameters: Vec<ConfigParameter>,
}

impl TrackerConfiguration {
    pub fn new(working_mode: WorkingMode, parameters: Vec<ConfigParameter>) -> Self {
        Self {
            working_mode,
            parameters,
        }
    }

    /// Look up a parameter value by name, case-insensitively.
    ///
    /// Unknown names yield "".
    pub fn value_of(&self, name: &str) -> &str {
        self.parameters
            .iter()
            .find(|parameter| parameter.name.eq_ignore_ascii_case(name))
            .map(|parameter| parameter.value.as_str())
            .unwrap_or("")
    }
}

/// The current default parameter schema, in display order.
pub fn default_parameters() -> Vec<ConfigParameter> {
    vec![
        ConfigParameter::new(PERSONAL_API_KEY, "", ParameterKind::Password, true),
        ConfigParameter::new(BRANCH_PREFIX, "scm", ParameterKind::BranchPrefix, false),
        ConfigParameter::new(TEAM_ID, "", ParameterKind::Text, false),
        ConfigParameter::new(SPACE_ID, "", ParameterKind::Text, false),
    ]
}

/// Merge a stored configuration into the default schema.
///
/// Starts from a copy of the defaults, then overwrites the value of every
/// default whose name matches a stored parameter (case-insensitive). Kind
/// and sensitivity always come from the defaults, so a corrupted stored
/// kind tag cannot propagate. Stored parameters with no default
/// counterpart are dropped. Without a stored configuration the defaults
/// apply with task-on-branch mode.
pub fn reconcile(
    stored: Option<TrackerConfiguration>,
    defaults: Vec<ConfigParameter>,
) -> TrackerConfiguration {
    let Some(stored) = stored else {
        return TrackerConfiguration::new(WorkingMode::TaskOnBranch, defaults);
    };

    let mut parameters = defaults;
    for stored_parameter in &stored.parameters {
        let matched = parameters
            .iter_mut()
            .find(|parameter| parameter.name.eq_ignore_ascii_case(&stored_parameter.name));
        if let Some(parameter) = matched {
            parameter.value = stored_parameter.value.clone();
        }
    }

    TrackerConfiguration::new(stored.working_mode, parameters)
}
