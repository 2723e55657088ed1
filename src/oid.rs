// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object identifiers used by the trust-policy layer.

use bcder::{ConstOid, Oid};

/// id-ce-extKeyUsage, 2.5.29.37
pub const OID_EXT_KEY_USAGE: ConstOid = Oid(&[85, 29, 37]);

/// id-ce-subjectKeyIdentifier, 2.5.29.14
pub const OID_SUBJECT_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 14]);

/// OpenSSL's private "reject" extension, 1.3.6.1.4.1.3319.6.10.1
pub const OID_OPENSSL_REJECTED: ConstOid = Oid(&[43, 6, 1, 4, 1, 153, 119, 6, 10, 1]);

/// anyExtendedKeyUsage, 2.5.29.37.0 — used as the reserved placeholder purpose
/// when a CertAux `trust` set resolves to empty but ExtKeyUsageSyntax requires
/// at least one OID.
pub const OID_ANY_EXTENDED_KEY_USAGE: ConstOid = Oid(&[85, 29, 37, 0]);
