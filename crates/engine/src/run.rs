// SPDX-License-Identifier: MIT

//! The Section Execution Engine pass loop (spec §4.7).

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use ztp_config::ConfigStore;
use ztp_core::{Clock, Paths, PidRegistry, SectionStatus};
use ztp_document::{PluginSpec, ProvisioningDocument, Section};
use ztp_net::SystemIdentity;
use ztp_plugin::{argv, exec, resolve};

use crate::outcome::{EngineOutcome, RebootTrigger};
use crate::verdict;

/// Process one section through a single pass: promote to IN-PROGRESS,
/// resolve and execute its plugin, classify the exit code. Mutates `section`
/// in place and persists the document after the status write, matching the
/// source's "rewrite shadow on every status change" behavior.
async fn process_section<C: Clock>(
    section: &mut Section,
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    clock: &C,
    registry: &PidRegistry,
) {
    if section.start_timestamp.is_none() {
        section.start_timestamp = Some(clock.now_iso());
    }
    section.status = SectionStatus::InProgress;
    section.timestamp = Some(clock.now_iso());

    let plugin_path = resolve::resolve(&section.name, &section.plugin, client, paths, cfg, identity, clock).await;

    let Some(plugin_path) = plugin_path else {
        section.status = SectionStatus::Failed;
        section.error = Some("Unable to find or download requested plugin".to_string());
        section.timestamp = Some(clock.now_iso());
        warn!(section = %section.name, "plugin resolution failed");
        return;
    };

    let spec: &PluginSpec = &section.plugin;
    let input_path = if spec.ignore_section_data { None } else { Some(paths.section_input_path(&section.name)) };
    let argv = argv::build(&plugin_path, input_path.as_deref(), spec.args.as_deref());

    let outcome = exec::run(registry, &argv, spec.shell, spec.umask.as_deref()).await;
    section.timestamp = Some(clock.now_iso());

    if let Some(err) = outcome.spawn_error {
        section.status = SectionStatus::Failed;
        section.error = Some(err);
        return;
    }

    let code = outcome.exit_code.unwrap_or(-1);
    section.exit_code = Some(code as i64);

    if code == 0 {
        section.status = SectionStatus::Success;
    } else if section.suspend_exit_code == Some(code as i64) {
        section.status = SectionStatus::Suspend;
    } else {
        section.status = SectionStatus::Failed;
        section.error = Some(format!("plugin exited with code {code}"));
    }

    debug!(section = %section.name, status = %section.status, code, "section execution complete");
}

fn reboot_fires(status: SectionStatus, policy: &ztp_document::PolicyFlags) -> bool {
    (status == SectionStatus::Success && policy.reboot_on_success)
        || (status == SectionStatus::Failed && policy.reboot_on_failure)
}

/// Run the execution engine over every non-terminal section of `doc` until
/// the working set is empty, a halting failure occurs, or a per-section
/// reboot fires (spec §4.7).
pub async fn run<C: Clock>(
    doc: &mut ProvisioningDocument,
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    registry: &PidRegistry,
    clock: &C,
) -> EngineOutcome {
    let mut aborted_on_halt = false;
    let mut reboot_trigger = None;
    let mut previous_suspend_pass: Option<BTreeMap<String, SectionStatus>> = None;
    let mut stable_suspend_passes: u32 = 0;

    'passes: loop {
        let working_set: Vec<String> =
            doc.sections.iter().filter(|(_, s)| !s.status.is_terminal()).map(|(k, _)| k.clone()).collect();

        if working_set.is_empty() {
            break;
        }

        for name in &working_set {
            let (status, policy) = {
                let Some(section) = doc.sections.get_mut(name) else { continue };
                if section.status.is_terminal() {
                    continue;
                }
                process_section(section, client, paths, cfg, identity, clock, registry).await;
                (section.status, section.policy)
            };

            if let Err(e) = doc.persist(paths) {
                warn!(error = %e, "failed to persist document after section execution");
            }

            let halt = status == SectionStatus::Failed && policy.halt_on_failure;

            if halt {
                aborted_on_halt = true;
                info!(section = %name, "halt-on-failure: aborting execution loop");
                break 'passes;
            }

            if reboot_fires(status, &policy) {
                reboot_trigger = Some(RebootTrigger { section: name.clone(), status });
                info!(section = %name, status = %status, "per-section reboot policy fired");
                break 'passes;
            }
        }

        // Stable-suspend convergence (spec §8 scenario 3, §9 open question:
        // "policy choice — after a complete pass with no status change for
        // the suspend set, mark them FAILED"). Scenario 3's narrative needs
        // three consecutive all-suspended passes with an unchanged set
        // before forcing FAILED, so two consecutive pass-over-pass matches
        // (stable_suspend_passes reaching 2) are required, not one.
        let suspend_pass: BTreeMap<String, SectionStatus> = working_set
            .iter()
            .filter_map(|n| doc.sections.get(n).map(|s| (n.clone(), s.status)))
            .filter(|(_, status)| *status == SectionStatus::Suspend)
            .collect();

        let unchanged = !suspend_pass.is_empty()
            && suspend_pass.len() == working_set.len()
            && previous_suspend_pass.as_ref() == Some(&suspend_pass);

        stable_suspend_passes = if unchanged { stable_suspend_passes + 1 } else { 0 };

        if stable_suspend_passes >= 2 {
            for name in suspend_pass.keys() {
                if let Some(section) = doc.sections.get_mut(name) {
                    section.status = SectionStatus::Failed;
                    section.error = Some("section remained suspended across a full pass with no progress".to_string());
                    section.timestamp = Some(clock.now_iso());
                }
            }
            if let Err(e) = doc.persist(paths) {
                warn!(error = %e, "failed to persist document after forcing stalled sections to FAILED");
            }
            info!(sections = ?suspend_pass.keys().collect::<Vec<_>>(), "suspended sections made no progress, forcing FAILED");
            break;
        }

        previous_suspend_pass = Some(suspend_pass);
    }

    let (document_status, document_error) = verdict::compute(doc);
    EngineOutcome { document_status, document_error, aborted_on_halt, reboot_trigger }
}
