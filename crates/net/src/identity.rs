// SPDX-License-Identifier: MIT

//! Device-identity lookups backing the reserved Identifier Resolver tags
//! (spec §4.2). EEPROM decoding and the exact SONiC version string are
//! treated as an external collaborator per spec §1 ("EEPROM/hostname
//! identifier helpers" are out of scope) — [`SystemIdentity`] is the seam a
//! platform-specific implementation plugs into.

/// Source of the OS/hardware facts the Identifier Resolver's reserved tags
/// map to. Fields return `None` when the underlying platform data is
/// unavailable, matching the source implementation's blank-filtering.
pub trait SystemIdentity: Send + Sync {
    fn hostname(&self) -> Option<String>;
    fn hostname_fqdn(&self) -> Option<String>;
    fn serial_number(&self) -> Option<String>;
    fn product_name(&self) -> Option<String>;
    fn mac_addr(&self) -> Option<String>;
    fn sonic_version(&self) -> Option<String>;
}

/// Reads what it can from the host OS via `nix::unistd::gethostname`; the
/// EEPROM-backed fields and SONiC version string are supplied by whatever
/// platform decoder the supervisor wires in, and default to `None` here.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSystemIdentity;

impl SystemIdentity for OsSystemIdentity {
    fn hostname(&self) -> Option<String> {
        nix::unistd::gethostname().ok().and_then(|s| s.into_string().ok())
    }

    fn hostname_fqdn(&self) -> Option<String> {
        // Resolving a true FQDN needs a DNS/`/etc/hosts` lookup of the short
        // hostname; we report the short name when that lookup isn't wired in.
        self.hostname()
    }

    fn serial_number(&self) -> Option<String> {
        None
    }

    fn product_name(&self) -> Option<String> {
        None
    }

    fn mac_addr(&self) -> Option<String> {
        None
    }

    fn sonic_version(&self) -> Option<String> {
        None
    }
}

/// Fixed-answer identity source for tests.
#[derive(Debug, Clone, Default)]
pub struct FakeSystemIdentity {
    pub hostname: Option<String>,
    pub hostname_fqdn: Option<String>,
    pub serial_number: Option<String>,
    pub product_name: Option<String>,
    pub mac_addr: Option<String>,
    pub sonic_version: Option<String>,
}

impl SystemIdentity for FakeSystemIdentity {
    fn hostname(&self) -> Option<String> {
        self.hostname.clone()
    }
    fn hostname_fqdn(&self) -> Option<String> {
        self.hostname_fqdn.clone()
    }
    fn serial_number(&self) -> Option<String> {
        self.serial_number.clone()
    }
    fn product_name(&self) -> Option<String> {
        self.product_name.clone()
    }
    fn mac_addr(&self) -> Option<String> {
        self.mac_addr.clone()
    }
    fn sonic_version(&self) -> Option<String> {
        self.sonic_version.clone()
    }
}
