// SPDX-License-Identifier: MIT

//! Status enums for the provisioning document and its sections (spec §3).

use serde::{Deserialize, Serialize};

/// Top-level document status (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum DocumentStatus {
    Boot,
    InProgress,
    Success,
    Failed,
}

impl DocumentStatus {
    /// Parse a status string, treating anything outside the valid enum as
    /// invalid (spec §4.5 step 5: "force DISABLED" — for the document this
    /// has no DISABLED variant, so the loader maps an invalid document
    /// status to `Failed` and the caller decides whether to restart).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "BOOT" => Some(Self::Boot),
            "IN-PROGRESS" => Some(Self::InProgress),
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

crate::simple_display! {
    DocumentStatus {
        Boot => "BOOT",
        InProgress => "IN-PROGRESS",
        Success => "SUCCESS",
        Failed => "FAILED",
    }
}

/// Per-section status (spec §3, state machine in §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum SectionStatus {
    Boot,
    InProgress,
    Success,
    Failed,
    Suspend,
    Disabled,
}

impl SectionStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "BOOT" => Some(Self::Boot),
            "IN-PROGRESS" => Some(Self::InProgress),
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            "SUSPEND" => Some(Self::Suspend),
            "DISABLED" => Some(Self::Disabled),
            _ => None,
        }
    }

    /// A section whose outcome is final for this supervisor run (spec §3 invariant:
    /// "A section never transitions backward from SUCCESS or FAILED ... within one run").
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Disabled)
    }

    /// Sections eligible to be (re-)promoted to IN-PROGRESS on a pass (spec §4.7).
    pub fn is_runnable(&self) -> bool {
        matches!(self, Self::Boot | Self::Suspend)
    }
}

crate::simple_display! {
    SectionStatus {
        Boot => "BOOT",
        InProgress => "IN-PROGRESS",
        Success => "SUCCESS",
        Failed => "FAILED",
        Suspend => "SUSPEND",
        Disabled => "DISABLED",
    }
}

/// What the supervisor should do once the discovery/execution cycle ends
/// (spec §4.9 "Restart decisions").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    /// Delete the persisted document and loop back to discovery.
    Retry,
    /// Wipe DHCP leases, sleep `restart-ztp-interval`, and re-enter discovery.
    Restart,
    /// Exit the supervisor loop.
    Stop,
}

crate::simple_display! {
    RestartDecision {
        Retry => "retry",
        Restart => "restart",
        Stop => "stop",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_status_round_trips_through_display_and_parse() {
        for s in [DocumentStatus::Boot, DocumentStatus::InProgress, DocumentStatus::Success, DocumentStatus::Failed] {
            assert_eq!(DocumentStatus::parse(&s.to_string()), Some(s));
        }
    }

    #[test]
    fn section_status_invalid_string_is_none() {
        assert_eq!(SectionStatus::parse("bogus"), None);
    }

    #[test]
    fn terminal_statuses_are_not_runnable() {
        assert!(SectionStatus::Success.is_terminal());
        assert!(!SectionStatus::Success.is_runnable());
        assert!(SectionStatus::Suspend.is_runnable());
        assert!(!SectionStatus::Suspend.is_terminal());
    }
}
