// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the trust-anchor ingestion core.

use thiserror::Error;

/// Errors that can occur while decoding, parsing, or indexing trust objects.
#[derive(Debug, Error)]
pub enum TrustParserError {
    #[error("ASN.1 decode error: {0}")]
    Asn1Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed persistence record: {0}")]
    MalformedPersistRecord(String),

    #[error("malformed PEM data: {0}")]
    MalformedPem(String),

    #[error("object index exhausted its handle space")]
    GeneralError,
}

impl<E: std::fmt::Display> From<bcder::decode::DecodeError<E>> for TrustParserError {
    fn from(e: bcder::decode::DecodeError<E>) -> Self {
        Self::Asn1Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrustParserError>;

/// The three-way outcome of a single format-specific parser attempt.
///
/// `Unrecognized` is not a fault: it tells the driver to try the next
/// format in the fixed sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseOutcome {
    Success,
    Unrecognized,
    Failure,
}
