// SPDX-License-Identifier: MIT

//! The Engine Supervisor (component C9, spec §4.9): the outer discovery/
//! execution loop that owns process lifetime, signal handling, and network
//! profile install/remove. Grounded on the source's `ZTPEngine.executeLoop`.

use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn};
use ztp_config::ConfigStore;
use ztp_core::{Clock, DocumentStatus, Paths, PidRegistry, RestartDecision};
use ztp_discovery::{LinkScanner, ProfileInstaller, SourceHit};
use ztp_document::ProvisioningDocument;
use ztp_net::SystemIdentity;

use crate::restart;

/// Every collaborator the supervisor loop needs. Generic over [`Clock`] so
/// tests can run the whole loop against a fake clock with no real sleeps.
pub struct Supervisor<C: Clock> {
    pub paths: Paths,
    pub cfg: ConfigStore,
    pub client: reqwest::Client,
    pub identity: Box<dyn SystemIdentity>,
    pub registry: PidRegistry,
    pub clock: C,
    pub profile: Box<dyn ProfileInstaller>,
    pub link_scanner: Box<dyn LinkScanner>,
    pub test_mode: bool,
}

fn activity(paths: &Paths, clock: &impl Clock, message: &str) {
    ztp_core::update_activity(&paths.ztp_activity, clock, message);
}

impl<C: Clock> Supervisor<C> {
    /// `executeLoop` (spec §4.9). Returns the process exit code.
    pub async fn run(&mut self) -> i32 {
        activity(&self.paths, &self.clock, "Initializing");

        if !self.cfg.get_bool("admin-mode").unwrap_or(true) {
            info!("ZTP is administratively disabled, removing profile and exiting");
            self.remove_profile(None);
            return 0;
        }

        let ztp_restart_requested = self.consume_restart_flag();

        if self.test_mode {
            info!("starting ZTP supervisor in test mode");
        } else {
            info!("starting ZTP supervisor");
        }

        let mut profile_loaded_for: Option<&'static str> = None;
        let mut reboot_on_completion = false;
        let final_doc;

        loop {
            activity(&self.paths, &self.clock, "Discovering provisioning data");

            let hit = match ztp_discovery::probe(&self.paths, &self.cfg, &self.client, self.identity.as_ref()).await {
                Ok(hit) => hit,
                Err(err) => {
                    let message = format!("Invalid provisioning data received: {err}");
                    if self.restart_on_invalid_data() {
                        self.force_restart_discovery(&message).await;
                        continue;
                    }
                    error!(%err, "invalid provisioning data, stopping (restart-ztp-on-invalid-data=false)");
                    activity(&self.paths, &self.clock, &message);
                    final_doc = None;
                    break;
                }
            };

            match hit {
                Some(SourceHit::ManualConfigPresent) => {
                    info!("manual configuration present, ZTP will not run");
                    final_doc = None;
                    break;
                }
                Some(SourceHit::Document { mode, path }) => {
                    info!(mode, path = %path.display(), "provisioning document discovered");
                    self.load_profile_once(&mut profile_loaded_for, "resume");

                    match self.process_document(&path, ztp_restart_requested).await {
                        Ok((decision, doc, reboot)) => match decision {
                            RestartDecision::Retry => continue,
                            RestartDecision::Restart => {
                                self.force_restart_discovery("ZTP restart requested").await;
                                profile_loaded_for = None;
                                continue;
                            }
                            RestartDecision::Stop => {
                                reboot_on_completion = reboot;
                                final_doc = Some(doc);
                                break;
                            }
                        },
                        Err(err) => {
                            let message = format!("Invalid provisioning data received: {err}");
                            if self.restart_on_invalid_data() {
                                self.force_restart_discovery(&message).await;
                                profile_loaded_for = None;
                                continue;
                            }
                            error!(%err, "invalid provisioning data, stopping (restart-ztp-on-invalid-data=false)");
                            activity(&self.paths, &self.clock, &message);
                            final_doc = None;
                            break;
                        }
                    }
                }
                None => {
                    self.load_profile_once(&mut profile_loaded_for, "discovery");

                    if self.link_scanner.scan() {
                        info!("link-up transition detected, restarting discovery interfaces");
                        self.restart_interfaces().await;
                    }

                    let interval = self.cfg.get_i64("discovery-interval").unwrap_or(10).max(0) as u64;
                    tokio::time::sleep(Duration::from_secs(interval)).await;
                }
            }
        }

        self.remove_profile(final_doc.as_ref());

        if reboot_on_completion && !self.test_mode {
            activity(&self.paths, &self.clock, "System reboot requested");
            self.reboot().await;
        }

        activity(&self.paths, &self.clock, "Exiting ZTP server");
        0
    }

    fn load_profile_once(&self, loaded_for: &mut Option<&'static str>, event: &'static str) {
        if self.test_mode || *loaded_for == Some(event) {
            return;
        }
        if let Err(err) = self.profile.install(event) {
            warn!(%err, event, "failed to install network profile");
        }
        *loaded_for = Some(event);
    }

    /// Consume the `ztp-restart-flag` marker an operator touches to request a
    /// restart (spec §4.9), reporting whether it was present so the caller
    /// can route a terminal document to `RestartDecision::Retry`.
    fn consume_restart_flag(&mut self) -> bool {
        if self.paths.ztp_restart_flag.exists() {
            let _ = std::fs::remove_file(&self.paths.ztp_restart_flag);
            true
        } else {
            false
        }
    }

    fn restart_on_invalid_data(&self) -> bool {
        self.cfg.get_bool("restart-ztp-on-invalid-data").unwrap_or(true)
    }

    /// `__processZTPJson` (spec §4.9): load the document, run the engine,
    /// decide what happens next. `ztp_restart_requested` is the
    /// `ztp-restart-flag` state consumed once at the top of [`Self::run`].
    async fn process_document(
        &mut self,
        path: &Path,
        ztp_restart_requested: bool,
    ) -> Result<(RestartDecision, ProvisioningDocument, bool), ztp_document::DocumentError> {
        let mut doc =
            ztp_document::load(path, &self.client, &self.paths, &self.cfg, self.identity.as_ref(), &self.clock)
                .await?;

        let outcome =
            ztp_engine::run(&mut doc, &self.client, &self.paths, &self.cfg, self.identity.as_ref(), &self.registry, &self.clock)
                .await;

        if let Some(trigger) = &outcome.reboot_trigger {
            warn!(section = trigger.section, status = %trigger.status, "section requested a reboot");
            if self.test_mode {
                info!("test mode: exiting instead of rebooting");
                std::process::exit(0);
            }
            self.reboot().await;
        }

        let monitor_startup_config = self.cfg.get_bool("monitor-startup-config").unwrap_or(true);
        let restart_requested = ztp_restart_requested && monitor_startup_config;
        let config_present = self.paths.config_db_json.exists();
        let (decision, reboot) = restart::decide(&doc, &outcome, config_present, restart_requested);

        if matches!(decision, RestartDecision::Restart | RestartDecision::Retry) {
            self.clear_document_files();
        }

        Ok((decision, doc, reboot))
    }

    fn clear_document_files(&self) {
        for p in [&self.paths.ztp_json, &self.paths.ztp_json_shadow] {
            let _ = std::fs::remove_file(p);
        }
        let monitor = self.cfg.get_bool("monitor-startup-config").unwrap_or(true);
        if monitor && self.paths.config_db_json.exists() {
            strip_ztp_key(&self.paths.config_db_json);
        }
    }

    /// `__forceRestartDiscovery` (spec §4.9): wipe leases, wait out
    /// `restart-ztp-interval`, then fall back to the discovery loop.
    async fn force_restart_discovery(&mut self, message: &str) {
        self.cleanup_dhcp_leases().await;
        let interval = self.cfg.get_i64("restart-ztp-interval").unwrap_or(300).max(0) as u64;
        warn!(message, wait_secs = interval, "forcing ZTP restart");
        activity(&self.paths, &self.clock, &format!("{message}. Waiting for {interval} seconds before restarting ZTP."));
        if !self.test_mode {
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
        self.clear_document_files();
    }

    async fn cleanup_dhcp_leases(&self) {
        if self.test_mode {
            return;
        }
        let _ = tokio::process::Command::new("/bin/sh")
            .arg("-c")
            .arg("rm -f /var/lib/dhcp/dhclient*.eth0.leases")
            .status()
            .await;
        if self.cfg.get_bool("feat-inband").unwrap_or(true) {
            let _ = tokio::process::Command::new("/bin/sh")
                .arg("-c")
                .arg("rm -f /var/lib/dhcp/dhclient*.Ethernet*.leases")
                .status()
                .await;
        }
    }

    async fn restart_interfaces(&self) {
        if self.test_mode {
            return;
        }
        let _ = tokio::process::Command::new("systemctl").arg("restart").arg("interfaces-config").status().await;
    }

    /// `__removeZTPProfile` (spec §4.9).
    fn remove_profile(&self, doc: Option<&ProvisioningDocument>) {
        if self.test_mode {
            return;
        }
        activity(&self.paths, &self.clock, "Verifying configuration");

        let config_fallback = match doc {
            Some(d) if matches!(d.status, DocumentStatus::Success | DocumentStatus::Failed) => d.policy.config_fallback,
            Some(_) => false,
            None => self.cfg.get_bool("config-fallback").unwrap_or(false),
        };

        if let Err(err) = self.profile.remove(config_fallback) {
            warn!(%err, "failed to remove network profile");
        }

        if self.paths.config_db_json.exists() {
            strip_ztp_key(&self.paths.config_db_json);
        }
    }

    /// `systemReboot` (spec §4.9).
    async fn reboot(&self) {
        if self.test_mode {
            return;
        }
        let status = tokio::process::Command::new("reboot").arg("-y").status().await;
        if status.map(|s| !s.success()).unwrap_or(true) {
            let _ = tokio::process::Command::new("reboot").status().await;
        }
    }
}

/// Best-effort: strip ZTP's own key out of the persisted startup config so a
/// restored manual configuration doesn't carry stale ZTP state.
fn strip_ztp_key(config_db_json: &Path) {
    let raw = match std::fs::read_to_string(config_db_json) {
        Ok(r) => r,
        Err(err) => {
            warn!(%err, path = %config_db_json.display(), "failed to read config_db.json");
            return;
        }
    };
    let mut value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(err) => {
            warn!(%err, "failed to parse config_db.json");
            return;
        }
    };
    let Some(obj) = value.as_object_mut() else { return };
    if obj.remove("ZTP").is_some() {
        if let Err(err) = ztp_core::atomic_write_json(config_db_json, &value) {
            error!(%err, "failed to rewrite config_db.json after stripping ZTP key");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ztp_core::FakeClock;
    use ztp_discovery::{FakeLinkScanner, FakeProfileInstaller};
    use ztp_net::FakeSystemIdentity;

    fn make_supervisor(dir: &Path, test_mode: bool) -> Supervisor<FakeClock> {
        Supervisor {
            paths: Paths::rooted_at(dir),
            cfg: ConfigStore::empty(),
            client: reqwest::Client::new(),
            identity: Box::new(FakeSystemIdentity::default()),
            registry: PidRegistry::new(),
            clock: FakeClock::default(),
            profile: Box::new(FakeProfileInstaller::default()),
            link_scanner: Box::new(FakeLinkScanner::default()),
            test_mode,
        }
    }

    #[tokio::test]
    async fn admin_mode_disabled_removes_profile_and_exits_immediately() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sup = make_supervisor(dir.path(), true);
        sup.cfg.set("admin-mode", serde_json::json!(false)).expect("set");

        let code = sup.run().await;
        assert_eq!(code, 0);
    }

    #[test]
    fn restart_on_invalid_data_defaults_to_true_and_honors_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sup = make_supervisor(dir.path(), true);
        assert!(sup.restart_on_invalid_data());

        sup.cfg.set("restart-ztp-on-invalid-data", serde_json::json!(false)).expect("set");
        assert!(!sup.restart_on_invalid_data());
    }

    #[tokio::test]
    async fn manual_config_present_stops_without_running_the_engine() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sup = make_supervisor(dir.path(), true);
        std::fs::create_dir_all(sup.paths.config_db_json.parent().expect("parent")).expect("mkdir");
        std::fs::write(&sup.paths.config_db_json, b"{}").expect("write");

        let code = sup.run().await;
        assert_eq!(code, 0);
    }
}
