//! Reindex lifecycle types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainName;

/// Per-domain reindex state: `Idle -> Running -> {Published, Failed}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReindexState {
    Idle,
    Running {
        run_id: Uuid,
        started_at: DateTime<Utc>,
    },
    Published {
        run_id: Uuid,
        version: u64,
        finished_at: DateTime<Utc>,
    },
    Failed {
        run_id: Uuid,
        error: String,
        finished_at: DateTime<Utc>,
    },
}

impl ReindexState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::Published { .. } => "published",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Outcome of a successful reindex
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexReport {
    pub run_id: Uuid,
    pub domain: DomainName,
    pub version: u64,
    pub documents_read: usize,
    pub documents_skipped: usize,
    pub chunks: usize,
    pub elapsed_ms: u64,
}

/// Observable state of one domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainStatus {
    pub domain: DomainName,
    pub reindex: ReindexState,
    pub published_version: Option<u64>,
    pub chunks: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(ReindexState::Idle.name(), "idle");

        let running = ReindexState::Running {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        };
        assert!(running.is_running());
        assert_eq!(running.name(), "running");
    }

    #[test]
    fn test_state_serializes_tagged() {
        let state = ReindexState::Published {
            run_id: Uuid::nil(),
            version: 4,
            finished_at: Utc::now(),
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "published");
        assert_eq!(json["version"], 4);
    }
}
