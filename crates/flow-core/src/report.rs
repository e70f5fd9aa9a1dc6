//! Outcome of a sync run

use std::fmt;

use flow_content::ArtifactKind;
use flow_git::CommitInfo;

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Created on the tenant
    Created,
    /// Updated on the tenant
    Updated,
    /// Written to the local tree
    Written,
    /// Both sides already matched
    Unchanged,
    /// Draft left out under the SKIP policy
    SkippedDraft,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Written => "written",
            Self::Unchanged => "unchanged",
            Self::SkippedDraft => "skipped (draft)",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub id: String,
    pub kind: ArtifactKind,
    pub action: Action,
}

/// Report from a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Per-artifact outcomes in processing order
    pub outcomes: Vec<ArtifactOutcome>,
    /// The package was read-only and nothing was touched
    pub skipped_read_only: bool,
    /// The package descriptor file was rewritten
    pub package_details_written: bool,
    /// Commit made after a pull, if any
    pub commit: Option<CommitInfo>,
}

impl SyncReport {
    pub fn read_only() -> Self {
        Self {
            skipped_read_only: true,
            ..Self::default()
        }
    }

    pub fn record(&mut self, id: &str, kind: ArtifactKind, action: Action) {
        self.outcomes.push(ArtifactOutcome {
            id: id.to_string(),
            kind,
            action,
        });
    }

    pub fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn action_for(&self, id: &str) -> Option<Action> {
        self.outcomes.iter().find(|o| o.id == id).map(|o| o.action)
    }

    /// Whether the run changed anything on either side.
    pub fn has_changes(&self) -> bool {
        self.package_details_written
            || self
                .outcomes
                .iter()
                .any(|o| matches!(o.action, Action::Created | Action::Updated | Action::Written))
    }

    /// One-line summary for the log.
    pub fn summary(&self) -> String {
        if self.skipped_read_only {
            return "package is read-only, nothing synced".to_string();
        }
        let mut parts = Vec::new();
        for action in [
            Action::Created,
            Action::Updated,
            Action::Written,
            Action::Unchanged,
            Action::SkippedDraft,
        ] {
            let n = self.count(action);
            if n > 0 {
                parts.push(format!("{n} {action}"));
            }
        }
        if parts.is_empty() {
            return "no artifacts processed".to_string();
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_non_zero_counts() {
        let mut report = SyncReport::default();
        report.record("A", ArtifactKind::Integration, Action::Written);
        report.record("B", ArtifactKind::ValueMapping, Action::Unchanged);
        report.record("C", ArtifactKind::Integration, Action::Unchanged);

        assert_eq!(report.summary(), "1 written, 2 unchanged");
        assert!(report.has_changes());
        assert_eq!(report.action_for("B"), Some(Action::Unchanged));
    }

    #[test]
    fn empty_report() {
        let report = SyncReport::default();
        assert_eq!(report.summary(), "no artifacts processed");
        assert!(!report.has_changes());
    }
}
