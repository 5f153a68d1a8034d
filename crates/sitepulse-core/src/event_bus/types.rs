use serde::{Deserialize, Serialize};

/// Lifecycle state carried by every site event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing running
    Idle,
    /// Client stream is attaching
    Connecting,
    /// Analysis running
    InProgress,
    /// Analysis finished successfully
    Completed,
    /// Analysis finished with errors (or was rejected)
    ErrorsFound,
    /// A repair is being applied
    Repairing,
    /// A repair finished
    Repaired,
    /// Client stream detached
    Disconnected,
}

impl RunState {
    /// Whether the state ends a run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::ErrorsFound)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::ErrorsFound => "errors_found",
            Self::Repairing => "repairing",
            Self::Repaired => "repaired",
            Self::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Platform the analysed site runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// WordPress site
    #[serde(alias = "wp")]
    WordPress,
    /// Anything else
    Generic,
}

impl Platform {
    /// Wire name of the platform
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WordPress => "wordpress",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wordpress" | "wp" => Ok(Self::WordPress),
            "generic" => Ok(Self::Generic),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// Events streamed to site observers.
///
/// Each variant carries only the fields that apply to it; absent optional
/// fields are omitted from the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SiteEvent {
    /// Run or connection state change
    Status {
        /// New state
        state: RunState,
        /// Overall progress, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        progress: Option<u8>,
        /// Detected platform
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<Platform>,
        /// Human readable note
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Progress tick
    Progress {
        /// Current state
        state: RunState,
        /// Overall progress (0-100)
        progress: u8,
    },
    /// Findings for one category
    Category {
        /// Current state
        state: RunState,
        /// Category name
        category: String,
        /// Issues found in the category
        issues: Vec<serde_json::Value>,
        /// Overall progress (0-100)
        progress: u8,
    },
    /// Repair progress for a category
    Repair {
        /// Repair state
        state: RunState,
        /// Category being repaired
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        /// Human readable note
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Estimated savings
    Savings {
        /// Current state
        state: RunState,
        /// Savings figures
        savings: serde_json::Map<String, serde_json::Value>,
    },
    /// Narrative summary of the run
    Summary {
        /// Current state
        state: RunState,
        /// Summary text
        message: String,
        /// Overall progress (0-100)
        progress: u8,
        /// Detected platform
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<Platform>,
    },
    /// Run failure
    Error {
        /// Current state
        state: RunState,
        /// Error description (sanitized)
        message: String,
    },
}

impl SiteEvent {
    /// Plain status event
    #[must_use]
    pub fn status(state: RunState) -> Self {
        Self::Status {
            state,
            progress: None,
            platform: None,
            message: None,
        }
    }

    /// Progress event in the running state
    #[must_use]
    pub fn progress(progress: u8) -> Self {
        Self::Progress {
            state: RunState::InProgress,
            progress: progress.min(100),
        }
    }

    /// Category findings in the running state
    #[must_use]
    pub fn category(
        category: impl Into<String>,
        issues: Vec<serde_json::Value>,
        progress: u8,
    ) -> Self {
        Self::Category {
            state: RunState::InProgress,
            category: category.into(),
            issues,
            progress: progress.min(100),
        }
    }

    /// Error event, always in the `errors_found` state
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            state: RunState::ErrorsFound,
            message: message.into(),
        }
    }

    /// Wire name of the event type
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Progress { .. } => "progress",
            Self::Category { .. } => "category",
            Self::Repair { .. } => "repair",
            Self::Savings { .. } => "savings",
            Self::Summary { .. } => "summary",
            Self::Error { .. } => "error",
        }
    }

    /// State carried by the event
    #[must_use]
    pub fn state(&self) -> RunState {
        match self {
            Self::Status { state, .. }
            | Self::Progress { state, .. }
            | Self::Category { state, .. }
            | Self::Repair { state, .. }
            | Self::Savings { state, .. }
            | Self::Summary { state, .. }
            | Self::Error { state, .. } => *state,
        }
    }

    /// Progress value, if the event carries one
    #[must_use]
    pub fn progress_value(&self) -> Option<u8> {
        match self {
            Self::Status { progress, .. } => *progress,
            Self::Progress { progress, .. }
            | Self::Category { progress, .. }
            | Self::Summary { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    /// A status event announcing a terminal state.
    #[must_use]
    pub fn is_terminal_status(&self) -> bool {
        matches!(self, Self::Status { state, .. } if state.is_terminal())
    }
}
