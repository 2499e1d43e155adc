// SPDX-License-Identifier: MIT

//! The Section Execution Engine (component C7).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod outcome;
pub mod run;
pub mod verdict;

pub use outcome::{EngineOutcome, RebootTrigger};
pub use run::run;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use ztp_config::ConfigStore;
    use ztp_core::{DocumentStatus, FakeClock, Paths, PidRegistry, SectionStatus};
    use ztp_document::ProvisioningDocument;
    use ztp_net::FakeSystemIdentity;

    async fn make_plugin(paths: &Paths, name: &str, script: &str) -> PathBuf {
        tokio::fs::create_dir_all(&paths.plugins_dir).await.expect("mkdir");
        let path = paths.plugins_dir.join(name);
        tokio::fs::write(&path, script).await.expect("write");
        let mut perms = tokio::fs::metadata(&path).await.expect("meta").permissions();
        std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
        tokio::fs::set_permissions(&path, perms).await.expect("chmod");
        path
    }

    async fn load_doc(paths: &Paths, env: serde_json::Value) -> ProvisioningDocument {
        let dir = paths.ztp_cfg_dir.clone();
        tokio::fs::create_dir_all(&dir).await.expect("mkdir");
        let path = dir.join("ztp_data.json");
        tokio::fs::write(&path, serde_json::to_vec(&json!({"ztp": env})).unwrap()).await.expect("write");

        let client = reqwest::Client::new();
        let cfg = ConfigStore::empty();
        let identity = FakeSystemIdentity::default();
        let clock = FakeClock::default();
        ztp_document::load(&path, &client, paths, &cfg, &identity, &clock).await.expect("load")
    }

    #[tokio::test]
    async fn all_sections_succeeding_yields_document_success() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(tmp.path());
        make_plugin(&paths, "0001-first", "#!/bin/sh\nexit 0\n").await;
        make_plugin(&paths, "0002-second", "#!/bin/sh\nexit 0\n").await;
        make_plugin(&paths, "0003-third", "#!/bin/sh\nexit 0\n").await;

        let mut doc = load_doc(
            &paths,
            json!({
                "0001-first": {},
                "0002-second": {},
                "0003-third": {},
            }),
        )
        .await;

        let client = reqwest::Client::new();
        let cfg = ConfigStore::empty();
        let identity = FakeSystemIdentity::default();
        let clock = FakeClock::default();
        let registry = PidRegistry::new();

        let outcome = run(&mut doc, &client, &paths, &cfg, &identity, &registry, &clock).await;

        assert_eq!(outcome.document_status, DocumentStatus::Success);
        assert!(!outcome.aborted_on_halt);
        for name in ["0001-first", "0002-second", "0003-third"] {
            assert_eq!(doc.sections[name].status, SectionStatus::Success);
        }
    }

    #[tokio::test]
    async fn halt_on_failure_stops_the_loop_before_later_sections_run() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(tmp.path());
        make_plugin(&paths, "0001-first", "#!/bin/sh\nexit 0\n").await;
        make_plugin(&paths, "0002-second", "#!/bin/sh\nexit 1\n").await;
        make_plugin(&paths, "0003-third", "#!/bin/sh\nexit 0\n").await;

        let mut doc = load_doc(
            &paths,
            json!({
                "0001-first": {},
                "0002-second": {"halt-on-failure": true},
                "0003-third": {},
            }),
        )
        .await;

        let client = reqwest::Client::new();
        let cfg = ConfigStore::empty();
        let identity = FakeSystemIdentity::default();
        let clock = FakeClock::default();
        let registry = PidRegistry::new();

        let outcome = run(&mut doc, &client, &paths, &cfg, &identity, &registry, &clock).await;

        assert!(outcome.aborted_on_halt);
        assert_eq!(outcome.document_status, DocumentStatus::Failed);
        assert_eq!(doc.sections["0001-first"].status, SectionStatus::Success);
        assert_eq!(doc.sections["0002-second"].status, SectionStatus::Failed);
        assert_eq!(doc.sections["0003-third"].status, SectionStatus::Boot);
    }

    #[tokio::test]
    async fn section_stuck_suspended_with_no_progress_is_forced_to_failed() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(tmp.path());
        let counter = tmp.path().join("invocations");
        make_plugin(
            &paths,
            "0001-stuck",
            &format!("#!/bin/sh\necho x >> {}\nexit 1\n", counter.display()),
        )
        .await;
        make_plugin(&paths, "0002-fine", "#!/bin/sh\nexit 0\n").await;

        let mut doc = load_doc(
            &paths,
            json!({
                "0001-stuck": {"suspend-exit-code": 1},
                "0002-fine": {},
            }),
        )
        .await;

        let client = reqwest::Client::new();
        let cfg = ConfigStore::empty();
        let identity = FakeSystemIdentity::default();
        let clock = FakeClock::default();
        let registry = PidRegistry::new();

        let outcome = run(&mut doc, &client, &paths, &cfg, &identity, &registry, &clock).await;

        assert_eq!(doc.sections["0002-fine"].status, SectionStatus::Success);
        assert_eq!(doc.sections["0001-stuck"].status, SectionStatus::Failed);
        assert_eq!(outcome.document_status, DocumentStatus::Failed);

        // Scenario 3's narrative ("Pass1 SUSPEND, Pass2 SUSPEND, Pass3
        // SUSPEND -> terminal") requires the stuck section to actually run
        // three times before convergence forces it to FAILED.
        let invocations = tokio::fs::read_to_string(&counter).await.unwrap_or_default();
        assert_eq!(invocations.lines().count(), 3);
    }

    #[tokio::test]
    async fn missing_plugin_fails_the_section_with_the_standard_message() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(tmp.path());
        tokio::fs::create_dir_all(&paths.plugins_dir).await.expect("mkdir");

        let mut doc = load_doc(&paths, json!({"0001-missing": {}})).await;

        let client = reqwest::Client::new();
        let cfg = ConfigStore::empty();
        let identity = FakeSystemIdentity::default();
        let clock = FakeClock::default();
        let registry = PidRegistry::new();

        run(&mut doc, &client, &paths, &cfg, &identity, &registry, &clock).await;

        let section = &doc.sections["0001-missing"];
        assert_eq!(section.status, SectionStatus::Failed);
        assert_eq!(section.error.as_deref(), Some("Unable to find or download requested plugin"));
    }
}
