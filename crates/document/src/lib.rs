// SPDX-License-Identifier: MIT

//! The Provisioning Document Loader (component C5).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod document;
pub mod error;
pub mod plugin_spec;
pub mod policy;
pub mod section;
pub mod shadow;
pub mod split;

pub use document::{load, ProvisioningDocument};
pub use error::DocumentError;
pub use plugin_spec::{PluginSource, PluginSpec};
pub use policy::PolicyFlags;
pub use section::Section;
