// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The trust-policy layer: location-flag reconciliation, duplicate
//! resolution, and CertAux-derived stapled extension synthesis.

use crate::asn1::certaux::CertAux;
use crate::attribute::{
    Attribute, AttributeSet, CKA_CLASS, CKA_ID, CKA_VALUE, CKA_X_CRITICAL, CKA_X_DISTRUSTED,
    CKA_TRUSTED, CKO_CERTIFICATE, CKO_X_CERTIFICATE_EXTENSION,
};
use crate::diag::DiagnosticSink;
use crate::error::Result;
use crate::index::{Handle, ObjectIndex};
use crate::oid::{OID_EXT_KEY_USAGE, OID_OPENSSL_REJECTED, OID_SUBJECT_KEY_IDENTIFIER};
use bcder::{ConstOid, Mode, Oid};

fn encode_oid(oid: ConstOid) -> Vec<u8> {
    let oid = Oid(oid.as_ref().into());
    let captured = bcder::Captured::from_values(Mode::Der, oid.encode_ref());
    captured.as_slice().to_vec()
}

/// Location a certificate was loaded from, governing how incoming trust
/// flags get reconciled against the object's existing ones.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Location {
    Anchor,
    Blacklist,
    Neither,
}

fn populate_trust(attrs: &AttributeSet, location: Location, diag: &DiagnosticSink) -> AttributeSet {
    match location {
        Location::Anchor => {
            if attrs.find_bool(CKA_X_DISTRUSTED) == Some(true) {
                diag.warn("certificate in anchor location is marked distrusted; not promoting to trusted");
                attrs.clone()
            } else {
                attrs
                    .take(CKA_TRUSTED, vec![1u8])
                    .take(CKA_X_DISTRUSTED, vec![0u8])
            }
        }
        Location::Blacklist => {
            if attrs.find_bool(CKA_TRUSTED) == Some(true) {
                diag.warn("certificate in blacklist location overrides its trusted flag");
            }
            attrs
                .take(CKA_TRUSTED, vec![0u8])
                .take(CKA_X_DISTRUSTED, vec![1u8])
        }
        Location::Neither => {
            let mut result = attrs.clone();
            if result.find_valid(CKA_TRUSTED).is_none() {
                result = result.take(CKA_TRUSTED, vec![0u8]);
            }
            if result.find_valid(CKA_X_DISTRUSTED).is_none() {
                result = result.take(CKA_X_DISTRUSTED, vec![0u8]);
            }
            result
        }
    }
}

fn priority(attrs: &AttributeSet) -> u8 {
    if attrs.find_bool(CKA_X_DISTRUSTED) == Some(true) {
        2
    } else if attrs.find_bool(CKA_TRUSTED) == Some(true) {
        1
    } else {
        0
    }
}

/// Applies location-flag reconciliation and duplicate resolution to an
/// incoming object, then inserts or replaces it in `index`. Returns the
/// handle the object now lives under, or `None` if it was discarded as a
/// lower-priority duplicate.
pub fn sink_object(
    index: &mut ObjectIndex,
    attrs: AttributeSet,
    location: Location,
    diag: &DiagnosticSink,
) -> Result<Option<Handle>> {
    let is_certificate = attrs.find_ulong(CKA_CLASS) == Some(CKO_CERTIFICATE);

    let attrs = if is_certificate {
        populate_trust(&attrs, location, diag)
    } else {
        attrs
    };

    if !is_certificate {
        let handle = index.replace(0, attrs)?;
        return Ok(Some(handle));
    }

    let template = AttributeSet::from_attributes([
        Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE),
        Attribute::new(CKA_VALUE, attrs.find_value(CKA_VALUE).unwrap_or_default().to_vec()),
    ]);

    match index.find(&template, None) {
        Some(existing_handle) => {
            let existing = index.lookup(existing_handle).expect("handle from find must resolve").clone();
            if priority(&attrs) <= priority(&existing) {
                diag.warn("discarding duplicate certificate with lower or equal trust priority");
                Ok(None)
            } else {
                let handle = index.replace(existing_handle, attrs)?;
                Ok(Some(handle))
            }
        }
        None => {
            let handle = index.replace(0, attrs)?;
            Ok(Some(handle))
        }
    }
}

fn oids_minus(trust: &[Oid], reject: &[Oid]) -> Vec<Oid> {
    trust
        .iter()
        .filter(|oid| !reject.iter().any(|r| r == *oid))
        .cloned()
        .collect()
}

/// Synthesizes the stapled extension objects CertAux implies for a
/// certificate with key identifier `cert_id`, and adjusts the certificate's
/// own trust flags according to whether its purpose set ended up empty.
///
/// `original` is the buffer `aux` was decoded from (zero-copy), used to
/// locate `keyid`'s exact byte range for the subjectKeyIdentifier staple.
pub fn stapled_attrs_for_cert_aux(
    aux: &CertAux,
    cert_id: Option<&[u8]>,
    original: &[u8],
) -> (Vec<AttributeSet>, Option<bool>) {
    let mut staples = Vec::new();
    let mut trusted_override = None;

    if let Some(trust) = &aux.trust {
        let reject = aux.reject.clone().unwrap_or_default();
        let purposes = oids_minus(trust, &reject);

        let syntax = crate::asn1::ext_key_usage::ExtKeyUsageSyntax::new(purposes.clone());
        let value = crate::asn1::encode_ext_key_usage(&syntax);

        let mut ext_attrs = vec![
            Attribute::ulong(CKA_CLASS, CKO_X_CERTIFICATE_EXTENSION),
            Attribute::new(crate::attribute::CKA_OBJECT_ID, encode_oid(OID_EXT_KEY_USAGE)),
            Attribute::bool(CKA_X_CRITICAL, true),
            Attribute::new(CKA_VALUE, value),
        ];
        if let Some(id) = cert_id {
            ext_attrs.push(Attribute::new(CKA_ID, id.to_vec()));
        }
        staples.push(AttributeSet::from_attributes(ext_attrs));

        trusted_override = Some(!purposes.is_empty());
    }

    if let Some(reject) = &aux.reject {
        if !reject.is_empty() {
            let syntax = crate::asn1::ext_key_usage::ExtKeyUsageSyntax::new(reject.clone());
            let value = crate::asn1::encode_ext_key_usage(&syntax);

            let mut ext_attrs = vec![
                Attribute::ulong(CKA_CLASS, CKO_X_CERTIFICATE_EXTENSION),
                Attribute::new(crate::attribute::CKA_OBJECT_ID, encode_oid(OID_OPENSSL_REJECTED)),
                Attribute::bool(CKA_X_CRITICAL, false),
                Attribute::new(CKA_VALUE, value),
            ];
            if let Some(id) = cert_id {
                ext_attrs.push(Attribute::new(CKA_ID, id.to_vec()));
            }
            staples.push(AttributeSet::from_attributes(ext_attrs));
        }
    }

    if let Some((start, end)) = crate::asn1::cert_aux_keyid_range(aux, original) {
        let mut ext_attrs = vec![
            Attribute::ulong(CKA_CLASS, CKO_X_CERTIFICATE_EXTENSION),
            Attribute::new(crate::attribute::CKA_OBJECT_ID, encode_oid(OID_SUBJECT_KEY_IDENTIFIER)),
            Attribute::bool(CKA_X_CRITICAL, false),
            Attribute::new(CKA_VALUE, original[start..=end].to_vec()),
        ];
        if let Some(id) = cert_id {
            ext_attrs.push(Attribute::new(CKA_ID, id.to_vec()));
        }
        staples.push(AttributeSet::from_attributes(ext_attrs));
    }

    (staples, trusted_override)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::attribute::CKA_VALUE;
    use crate::diag::set_quiet;

    fn diag() -> DiagnosticSink<'static> {
        DiagnosticSink::new("test")
    }

    #[test]
    fn anchor_promotes_to_trusted() {
        let attrs = AttributeSet::from_attributes([Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE)]);
        let out = populate_trust(&attrs, Location::Anchor, &diag());
        assert_eq!(out.find_bool(CKA_TRUSTED), Some(true));
        assert_eq!(out.find_bool(CKA_X_DISTRUSTED), Some(false));
    }

    #[test]
    fn blacklist_forces_distrust() {
        set_quiet();
        let attrs = AttributeSet::from_attributes([
            Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE),
            Attribute::bool(CKA_TRUSTED, true),
        ]);
        let out = populate_trust(&attrs, Location::Blacklist, &diag());
        assert_eq!(out.find_bool(CKA_TRUSTED), Some(false));
        assert_eq!(out.find_bool(CKA_X_DISTRUSTED), Some(true));
        crate::diag::set_loud();
    }

    #[test]
    fn duplicate_resolution_keeps_higher_priority() {
        set_quiet();
        let mut index = ObjectIndex::new();
        let d = diag();

        let trusted = AttributeSet::from_attributes([
            Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE),
            Attribute::new(CKA_VALUE, vec![1, 2, 3]),
            Attribute::bool(CKA_TRUSTED, true),
        ]);
        let h1 = sink_object(&mut index, trusted, Location::Neither, &d).unwrap().unwrap();

        let distrusted = AttributeSet::from_attributes([
            Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE),
            Attribute::new(CKA_VALUE, vec![1, 2, 3]),
        ]);
        let h2 = sink_object(&mut index, distrusted, Location::Blacklist, &d).unwrap().unwrap();

        assert_eq!(h1, h2);
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(h1).unwrap().find_bool(CKA_X_DISTRUSTED), Some(true));
        crate::diag::set_loud();
    }

    #[test]
    fn lower_priority_duplicate_is_discarded() {
        set_quiet();
        let mut index = ObjectIndex::new();
        let d = diag();

        let distrusted = AttributeSet::from_attributes([
            Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE),
            Attribute::new(CKA_VALUE, vec![9, 9, 9]),
            Attribute::bool(CKA_X_DISTRUSTED, true),
        ]);
        sink_object(&mut index, distrusted, Location::Neither, &d).unwrap();

        let trusted = AttributeSet::from_attributes([
            Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE),
            Attribute::new(CKA_VALUE, vec![9, 9, 9]),
            Attribute::bool(CKA_TRUSTED, true),
        ]);
        let result = sink_object(&mut index, trusted, Location::Neither, &d).unwrap();
        assert!(result.is_none());
        assert_eq!(index.len(), 1);
        crate::diag::set_loud();
    }
}
