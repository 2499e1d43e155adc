// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while constructing a [`crate::url::Url`] or
/// [`crate::url::DynamicUrl`] from provisioning-document JSON (spec §4.3).
#[derive(Debug, Error)]
pub enum UrlShapeError {
    #[error("url spec is missing a 'source' field")]
    MissingSource,

    #[error("url 'source' must be a string")]
    SourceNotString,

    #[error("url 'destination' must be a string")]
    DestinationNotString,

    #[error("dynamic url 'prefix' must be a string")]
    PrefixNotString,

    #[error("dynamic url 'suffix' must be a string")]
    SuffixNotString,

    #[error("dynamic url is missing a 'source.identifier' field")]
    MissingIdentifier,

    #[error("dynamic url identifier could not be resolved")]
    IdentifierUnresolved,
}
