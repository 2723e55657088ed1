// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hand-built DER fixtures for tests. Not a real, verifiable certificate —
//! just a structurally valid `Certificate` (empty issuer/subject names,
//! filler key/signature bytes) sufficient to exercise the decode paths.

/// A minimal, structurally-valid DER X.509 certificate: empty issuer and
/// subject names, a 2020-2049 validity window, and filler public-key /
/// signature bytes.
#[rustfmt::skip]
pub const SELF_SIGNED_CERT_DER: &[u8] = &[
    0x30, 0x7E,
        0x30, 0x5A,
            0x02, 0x01, 0x01,
            0x30, 0x0D, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B, 0x05, 0x00,
            0x30, 0x00,
            0x30, 0x1E,
                0x17, 0x0D, 0x32, 0x30, 0x30, 0x31, 0x30, 0x31, 0x30, 0x30, 0x30, 0x30, 0x30, 0x30, 0x5A,
                0x17, 0x0D, 0x34, 0x39, 0x31, 0x32, 0x33, 0x31, 0x32, 0x33, 0x35, 0x39, 0x35, 0x39, 0x5A,
            0x30, 0x00,
            0x30, 0x22,
                0x30, 0x0D, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B, 0x05, 0x00,
                0x03, 0x11, 0x00,
                0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        0x30, 0x0D, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B, 0x05, 0x00,
        0x03, 0x11, 0x00,
        0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB,
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixture_decodes_as_a_certificate() {
        use crate::asn1::{decode, SchemaElement};
        use bytes::Bytes;

        let node = decode(Bytes::from_static(SELF_SIGNED_CERT_DER), SchemaElement::Certificate);
        assert!(node.is_some());
    }
}
