// SPDX-License-Identifier: MIT

//! Network components: the Downloader (C1), Identifier Resolver (C2), and
//! URL / Dynamic URL (C3).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod downloader;
pub mod error;
pub mod identifier;
pub mod identity;
pub mod url;

pub use downloader::{DownloadOptions, DownloadOutcome};
pub use error::UrlShapeError;
pub use identifier::IdentifierSpec;
pub use identity::{FakeSystemIdentity, OsSystemIdentity, SystemIdentity};
pub use url::{DynamicUrl, Url};
