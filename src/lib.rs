// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A trust-anchor ingestion core: decodes X.509 certificates and OpenSSL
//! trusted-certificate auxiliary metadata, reads the `[p11-kit-object-v1]`
//! textual persistence grammar, and applies anchor/blacklist trust policy to
//! populate a PKCS#11-style object index.
//!
//! Low-level ASN.1 primitives are defined in modules having the name of the
//! RFC in which they are defined.

pub mod asn1;
pub mod asn1time;
pub mod attribute;
pub mod diag;
pub mod driver;
pub mod error;
pub mod index;
pub mod oid;
pub mod parser;
pub mod path;
pub mod pem;
pub mod persist;
pub mod rfc3280;
pub mod rfc4519;
pub mod rfc5280;
pub mod trust;
pub mod utf8;
pub mod x509;

#[cfg(test)]
pub(crate) mod testutil;
