// SPDX-License-Identifier: MIT

//! Post-run restart/reboot decision (spec §4.9 "Restart decisions"),
//! grounded on the tail of the source's `__processZTPJson`: once the engine
//! finishes, decide whether to restart discovery (deleting the persisted
//! document) or stop, and whether a reboot was requested for the run as a
//! whole — separate from any per-section reboot the engine already reported.

use ztp_core::{DocumentStatus, RestartDecision};
use ztp_document::ProvisioningDocument;
use ztp_engine::EngineOutcome;

/// `(restart decision, document-level reboot requested)`.
///
/// The document-level reboot is evaluated against the *final* document
/// status and the document's own `reboot-on-success`/`reboot-on-failure`
/// flags, mirroring `__evalZTPResult`'s `__rebootAction(..., delayed_reboot=True)`
/// call — deferred until after profile removal, unlike a section's reboot
/// trigger which the engine already reports as firing immediately.
///
/// `restart_requested` carries the operator-requested restart flag (the
/// `ztp-restart-flag` marker, consumed once per run by the caller): once the
/// document reaches a terminal status and `monitor-startup-config` held when
/// the flag was consumed, it takes priority and yields `Retry` rather than
/// `Restart`/`Stop`, mirroring `__processZTPJson`'s terminal-status branch.
pub fn decide(
    doc: &ProvisioningDocument,
    outcome: &EngineOutcome,
    config_present: bool,
    restart_requested: bool,
) -> (RestartDecision, bool) {
    let reboot = (outcome.document_status == DocumentStatus::Success && doc.policy.reboot_on_success)
        || (outcome.document_status == DocumentStatus::Failed && doc.policy.reboot_on_failure);

    let terminal = matches!(outcome.document_status, DocumentStatus::Success | DocumentStatus::Failed);

    if restart_requested && terminal {
        return (RestartDecision::Retry, reboot);
    }

    let restart_on_failure = outcome.document_status == DocumentStatus::Failed && doc.policy.restart_ztp_on_failure;

    let restart_missing_config =
        terminal && doc.policy.restart_ztp_no_config && !doc.policy.config_fallback && !config_present;

    if restart_on_failure || restart_missing_config {
        (RestartDecision::Restart, reboot)
    } else {
        (RestartDecision::Stop, reboot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use ztp_document::PolicyFlags;

    fn doc(policy: PolicyFlags) -> ProvisioningDocument {
        ProvisioningDocument {
            status: DocumentStatus::Success,
            start_timestamp: None,
            timestamp: None,
            ztp_json_source: None,
            ztp_json_version: "1.0".to_string(),
            policy,
            sections: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    fn outcome(status: DocumentStatus) -> EngineOutcome {
        EngineOutcome { document_status: status, document_error: None, aborted_on_halt: false, reboot_trigger: None }
    }

    #[test]
    fn success_with_config_present_stops_without_reboot() {
        let policy = PolicyFlags { restart_ztp_no_config: true, ..Default::default() };
        let (decision, reboot) = decide(&doc(policy), &outcome(DocumentStatus::Success), true, false);
        assert_eq!(decision, ztp_core::RestartDecision::Stop);
        assert!(!reboot);
    }

    #[test]
    fn success_without_config_and_restart_no_config_restarts() {
        let policy = PolicyFlags { restart_ztp_no_config: true, ..Default::default() };
        let (decision, _) = decide(&doc(policy), &outcome(DocumentStatus::Success), false, false);
        assert_eq!(decision, ztp_core::RestartDecision::Restart);
    }

    #[test]
    fn config_fallback_suppresses_missing_config_restart() {
        let policy = PolicyFlags { restart_ztp_no_config: true, config_fallback: true, ..Default::default() };
        let (decision, _) = decide(&doc(policy), &outcome(DocumentStatus::Success), false, false);
        assert_eq!(decision, ztp_core::RestartDecision::Stop);
    }

    #[test]
    fn failed_with_restart_on_failure_restarts() {
        let policy = PolicyFlags { restart_ztp_on_failure: true, ..Default::default() };
        let (decision, _) = decide(&doc(policy), &outcome(DocumentStatus::Failed), true, false);
        assert_eq!(decision, ztp_core::RestartDecision::Restart);
    }

    #[test]
    fn success_with_reboot_on_success_requests_deferred_reboot() {
        let policy = PolicyFlags { reboot_on_success: true, ..Default::default() };
        let (decision, reboot) = decide(&doc(policy), &outcome(DocumentStatus::Success), true, false);
        assert_eq!(decision, ztp_core::RestartDecision::Stop);
        assert!(reboot);
    }

    #[test]
    fn failed_with_reboot_on_failure_requests_deferred_reboot() {
        let policy = PolicyFlags { reboot_on_failure: true, ..Default::default() };
        let (_, reboot) = decide(&doc(policy), &outcome(DocumentStatus::Failed), true, false);
        assert!(reboot);
    }

    #[test]
    fn operator_restart_request_yields_retry_once_document_is_terminal() {
        let policy = PolicyFlags::default();
        let (decision, _) = decide(&doc(policy), &outcome(DocumentStatus::Success), true, true);
        assert_eq!(decision, ztp_core::RestartDecision::Retry);
    }

    #[test]
    fn operator_restart_request_is_ignored_while_in_progress() {
        let policy = PolicyFlags::default();
        let (decision, _) = decide(&doc(policy), &outcome(DocumentStatus::InProgress), true, true);
        assert_eq!(decision, ztp_core::RestartDecision::Stop);
    }

    #[test]
    fn operator_restart_request_takes_priority_over_restart_on_failure() {
        let policy = PolicyFlags { restart_ztp_on_failure: true, ..Default::default() };
        let (decision, _) = decide(&doc(policy), &outcome(DocumentStatus::Failed), true, true);
        assert_eq!(decision, ztp_core::RestartDecision::Retry);
    }
}
