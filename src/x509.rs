// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! X.509 helpers: key identifier computation over a decoded certificate.

use crate::rfc5280::Certificate;
use ring::digest;

/// SHA-1 digest length in bytes.
pub const KEYID_LEN: usize = 20;

/// Computes a key identifier as the SHA-1 digest of the certificate's
/// `subjectPublicKeyInfo.subjectPublicKey` BIT STRING contents (the unused-bits
/// count octet is not part of the digest input; `BitString::octet_bytes`
/// already excludes it).
pub fn calc_keyid(cert: &Certificate) -> [u8; KEYID_LEN] {
    let key_bytes = cert
        .tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .octet_bytes();

    let digest = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, key_bytes.as_ref());

    let mut out = [0u8; KEYID_LEN];
    out.copy_from_slice(digest.as_ref());
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::asn1::{decode, SchemaElement};
    use bytes::Bytes;

    // A minimal self-signed-looking certificate isn't worth hand-encoding
    // here; `driver`'s integration tests exercise `calc_keyid` against real
    // certificate fixtures. This module is covered by the round-trip checks
    // there.
    #[test]
    fn keyid_is_stable_for_identical_input() {
        // Two independent decodes of the same bytes must agree.
        let der = crate::testutil::SELF_SIGNED_CERT_DER;
        let a = decode(Bytes::from_static(der), SchemaElement::Certificate)
            .and_then(|n| n.as_certificate().map(|c| calc_keyid(c)));
        let b = decode(Bytes::from_static(der), SchemaElement::Certificate)
            .and_then(|n| n.as_certificate().map(|c| calc_keyid(c)));
        assert_eq!(a, b);
        assert!(a.is_some());
    }
}
