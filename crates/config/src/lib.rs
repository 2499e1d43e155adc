// SPDX-License-Identifier: MIT

//! The Config Store (component C4): typed access over the persisted
//! `ztp_cfg.json` policy/timing overlay, layered on the built-in defaults
//! table from `defaults.py` in the source implementation.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod defaults;
pub mod error;
pub mod store;

pub use defaults::{default_of, kind_of, DefaultEntry, ValueKind};
pub use error::ConfigError;
pub use store::{coerce_bool, ConfigStore};
