// SPDX-License-Identifier: MIT

//! Result types returned by the Section Execution Engine (spec §4.7).

use ztp_core::{DocumentStatus, SectionStatus};

/// A per-section reboot flag fired while the engine was running (spec §4.9:
/// "When triggered by a section during execution ... reboot immediately" /
/// "In test mode, a per-section reboot is replaced by a clean exit"). The
/// engine itself never reboots or exits the process — it just stops the
/// pass loop and hands the decision to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebootTrigger {
    pub section: String,
    pub status: SectionStatus,
}

/// What a full engine run produced.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub document_status: DocumentStatus,
    pub document_error: Option<String>,
    /// Set when the loop stopped early because a FAILED section had
    /// `halt-on-failure=true`.
    pub aborted_on_halt: bool,
    /// Set when a section's reboot policy fired during this run; the loop
    /// stops immediately once this is set (spec §4.7: "after each section:
    /// apply per-section reboot flag").
    pub reboot_trigger: Option<RebootTrigger>,
}
