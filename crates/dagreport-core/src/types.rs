use serde::{Deserialize, Serialize};

/// Label the scheduler gives a step that ended in error.
pub const FAILED_LABEL: &str = "failed";

/// Overall state of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    None,
    Running,
    Success,
    Error,
    Cancelled,
    PartialSuccess,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "None",
            Self::Running => "Running",
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Cancelled => "Cancelled",
            Self::PartialSuccess => "PartialSuccess",
        };
        f.write_str(s)
    }
}

/// State of a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    #[default]
    None,
    Running,
    Success,
    Error,
    Cancelled,
    Skipped,
}

impl NodeState {
    /// Human label as shown by the scheduler.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "not started",
            Self::Running => "running",
            Self::Success => "finished",
            Self::Error => FAILED_LABEL,
            Self::Cancelled => "canceled",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of one step. Created when the step starts, finalized when it completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStatus {
    pub name: String,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    pub started_at: String,
    pub finished_at: String,
    pub status: NodeState,
    pub status_text: String,
    pub error: String,
}

impl NodeStatus {
    pub fn new(name: impl Into<String>, status: NodeState) -> Self {
        Self {
            name: name.into(),
            status,
            status_text: status.label().to_string(),
            ..Default::default()
        }
    }

    /// Command with its arguments, space-separated.
    pub fn command_line(&self) -> String {
        match &self.args {
            Some(args) if !args.is_empty() => format!("{} {}", self.command, args.join(" ")),
            _ => self.command.clone(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status_text == FAILED_LABEL
    }
}

/// Snapshot of a whole run. `nodes` are in execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStatus {
    pub request_id: String,
    pub name: String,
    pub params: String,
    pub started_at: String,
    pub finished_at: String,
    pub status: RunState,
    pub nodes: Vec<NodeStatus>,
}

impl RunStatus {
    /// Parse a status snapshot as written by the scheduler.
    pub fn from_json(input: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn node(&self, name: &str) -> Option<&NodeStatus> {
        self.nodes.iter().find(|n| n.name == name)
    }
}
