// SPDX-License-Identifier: MIT

//! Network-discovery profile install/remove (spec §1: "OS-integration
//! scripts that install/remove a DHCP-ready network profile; treated as an
//! opaque command with well-defined arguments" — out of scope beyond this
//! seam). Grounded on the source's `ztp-profile.sh install <event>` /
//! `ztp-profile.sh remove [--config-fallback]` invocation.

use std::io;

/// Installs or removes the network-discovery profile. A blocking call by
/// design: spec §5 models subprocess execution as one of the supervisor's
/// blocking suspension points.
pub trait ProfileInstaller: Send + Sync {
    fn install(&self, event: &str) -> io::Result<bool>;
    fn remove(&self, config_fallback: bool) -> io::Result<bool>;
}

/// Shells out to `<ztp-lib-dir>/ztp-profile.sh`.
pub struct ShellProfileInstaller {
    pub script: std::path::PathBuf,
}

impl ShellProfileInstaller {
    pub fn new(ztp_lib_dir: &std::path::Path) -> Self {
        Self { script: ztp_lib_dir.join("ztp-profile.sh") }
    }
}

impl ProfileInstaller for ShellProfileInstaller {
    fn install(&self, event: &str) -> io::Result<bool> {
        let status = std::process::Command::new(&self.script).arg("install").arg(event).status()?;
        Ok(status.success())
    }

    fn remove(&self, config_fallback: bool) -> io::Result<bool> {
        let mut cmd = std::process::Command::new(&self.script);
        cmd.arg("remove");
        if config_fallback {
            cmd.arg("--config-fallback");
        }
        Ok(cmd.status()?.success())
    }
}

/// Records calls without touching the filesystem, for tests.
#[derive(Default)]
pub struct FakeProfileInstaller {
    pub installs: parking_lot::Mutex<Vec<String>>,
    pub removes: parking_lot::Mutex<Vec<bool>>,
}

impl ProfileInstaller for FakeProfileInstaller {
    fn install(&self, event: &str) -> io::Result<bool> {
        self.installs.lock().push(event.to_string());
        Ok(true)
    }

    fn remove(&self, config_fallback: bool) -> io::Result<bool> {
        self.removes.lock().push(config_fallback);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_installer_records_install_events() {
        let installer = FakeProfileInstaller::default();
        installer.install("discovery").expect("install");
        assert_eq!(installer.installs.lock().as_slice(), ["discovery"]);
    }

    #[test]
    fn fake_installer_records_remove_config_fallback_flag() {
        let installer = FakeProfileInstaller::default();
        installer.remove(true).expect("remove");
        assert_eq!(installer.removes.lock().as_slice(), [true]);
    }
}
