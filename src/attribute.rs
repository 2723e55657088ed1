// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The attribute value model: a cryptographic-token style `(id, bytes)`
//! collection, plus the ids this crate's object classes make use of.

use std::collections::BTreeMap;

pub type AttributeId = u32;

/// Marks a slot as "omit this attribute" when passed to [`AttributeSet::build`].
pub const CKA_INVALID: AttributeId = u32::MAX;

pub const CKA_CLASS: AttributeId = 0x0000_0000;
pub const CKA_TOKEN: AttributeId = 0x0000_0001;
pub const CKA_PRIVATE: AttributeId = 0x0000_0002;
pub const CKA_LABEL: AttributeId = 0x0000_0003;
pub const CKA_APPLICATION: AttributeId = 0x0000_0010;
pub const CKA_VALUE: AttributeId = 0x0000_0011;
pub const CKA_OBJECT_ID: AttributeId = 0x0000_0012;
pub const CKA_CERTIFICATE_TYPE: AttributeId = 0x0000_0080;
pub const CKA_ID: AttributeId = 0x0000_0102;
pub const CKA_TRUSTED: AttributeId = 0x0000_0086;
pub const CKA_MODIFIABLE: AttributeId = 0x0000_0170;
pub const CKA_CERTIFICATE_CATEGORY: AttributeId = 0x0000_0087;

/// Vendor-extension range (p11-kit's `CKA_X_VENDOR` base).
const CKA_X_VENDOR: AttributeId = 0x8000_0000;
pub const CKA_X_DISTRUSTED: AttributeId = CKA_X_VENDOR + 4;
pub const CKA_X_CRITICAL: AttributeId = CKA_X_VENDOR + 6;

pub const CKO_DATA: u64 = 0x0000_0000;
pub const CKO_CERTIFICATE: u64 = 0x0000_0001;
pub const CKO_NSS_TRUST: u64 = 0xCE53_4351;
const CKO_X_VENDOR: u64 = 0x8000_0000;
pub const CKO_X_CERTIFICATE_EXTENSION: u64 = CKO_X_VENDOR + 3;

pub const CKC_X_509: u64 = 0x0000_0000;

pub const CKT_NSS_TRUST_UNKNOWN: u64 = 0xCE53_4351;
pub const CKT_NSS_TRUSTED: u64 = CKT_NSS_TRUST_UNKNOWN + 1;
pub const CKT_NSS_TRUSTED_DELEGATOR: u64 = CKT_NSS_TRUST_UNKNOWN + 2;
pub const CKT_NSS_MUST_VERIFY_TRUST: u64 = CKT_NSS_TRUST_UNKNOWN + 3;
pub const CKT_NSS_NOT_TRUSTED: u64 = CKT_NSS_TRUST_UNKNOWN + 10;

/// The `trust-*` attribute family used by the persistence grammar maps onto
/// NSS trust attribute ids by purpose.
pub const CKA_TRUST_SERVER_AUTH: AttributeId = 0x0000_0001 + 0x0000_0100;
pub const CKA_TRUST_CLIENT_AUTH: AttributeId = 0x0000_0002 + 0x0000_0100;
pub const CKA_TRUST_CODE_SIGNING: AttributeId = 0x0000_0003 + 0x0000_0100;
pub const CKA_TRUST_EMAIL_PROTECTION: AttributeId = 0x0000_0004 + 0x0000_0100;

/// A single attribute value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    pub id: AttributeId,
    pub bytes: Vec<u8>,
}

impl Attribute {
    pub fn new(id: AttributeId, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            bytes: bytes.into(),
        }
    }

    pub fn bool(id: AttributeId, value: bool) -> Self {
        Self::new(id, vec![value as u8])
    }

    pub fn ulong(id: AttributeId, value: u64) -> Self {
        Self::new(id, value.to_ne_bytes().to_vec())
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.bytes.first().map(|b| *b != 0)
    }

    pub fn as_ulong(&self) -> Option<u64> {
        let arr: [u8; 8] = self.bytes.as_slice().try_into().ok()?;
        Some(u64::from_ne_bytes(arr))
    }
}

/// A finite collection of attributes with unique ids. Order of insertion is
/// preserved for deterministic encoding and diagnostics.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttributeSet {
    order: Vec<AttributeId>,
    values: BTreeMap<AttributeId, Vec<u8>>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attrs: impl IntoIterator<Item = Attribute>) -> Self {
        let mut set = Self::new();
        for attr in attrs {
            set.set(attr.id, attr.bytes);
        }
        set
    }

    fn set(&mut self, id: AttributeId, bytes: Vec<u8>) {
        if self.values.insert(id, bytes).is_none() {
            self.order.push(id);
        }
    }

    /// Builds a new set from `base` overridden/extended by `overrides`, in
    /// order; attributes with id [`CKA_INVALID`] are omitted entirely.
    pub fn build(base: &Self, overrides: impl IntoIterator<Item = Attribute>) -> Self {
        let mut result = base.clone();
        for attr in overrides {
            if attr.id == CKA_INVALID {
                continue;
            }
            result.set(attr.id, attr.bytes);
        }
        result
    }

    /// Merges `overlay` into `self`. When `replace` is false, ids already
    /// present in `self` keep their existing value.
    pub fn merge(&self, overlay: &Self, replace: bool) -> Self {
        let mut result = self.clone();
        for id in &overlay.order {
            if !replace && result.values.contains_key(id) {
                continue;
            }
            result.set(*id, overlay.values[id].clone());
        }
        result
    }

    /// Returns a copy of `self` with `id`'s value replaced.
    pub fn take(&self, id: AttributeId, bytes: impl Into<Vec<u8>>) -> Self {
        let mut result = self.clone();
        result.set(id, bytes.into());
        result
    }

    pub fn find_value(&self, id: AttributeId) -> Option<&[u8]> {
        self.values.get(&id).map(|v| v.as_slice())
    }

    pub fn find_bool(&self, id: AttributeId) -> Option<bool> {
        self.find_value(id).and_then(|b| b.first()).map(|b| *b != 0)
    }

    pub fn find_ulong(&self, id: AttributeId) -> Option<u64> {
        let bytes = self.find_value(id)?;
        let arr: [u8; 8] = bytes.try_into().ok()?;
        Some(u64::from_ne_bytes(arr))
    }

    /// Like [`find_value`](Self::find_value), but returns `None` for an id
    /// explicitly stored as [`CKA_INVALID`]'s sentinel semantics don't apply
    /// here since `CKA_INVALID` is never a storable id; this distinguishes
    /// "absent" from "present with an empty value".
    pub fn find_valid(&self, id: AttributeId) -> Option<Attribute> {
        self.values.get(&id).map(|bytes| Attribute {
            id,
            bytes: bytes.clone(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.order.iter().map(move |id| Attribute {
            id: *id,
            bytes: self.values[id].clone(),
        })
    }

    /// True iff every attribute in `template` is present in `self` with an
    /// identical byte value.
    pub fn matches(&self, template: &Self) -> bool {
        template
            .order
            .iter()
            .all(|id| self.values.get(id) == template.values.get(id))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_omits_invalid_slots() {
        let base = AttributeSet::from_attributes([Attribute::bool(CKA_TOKEN, true)]);
        let built = AttributeSet::build(
            &base,
            [
                Attribute::new(CKA_INVALID, vec![]),
                Attribute::bool(CKA_PRIVATE, false),
            ],
        );
        assert!(built.find_valid(CKA_INVALID).is_none());
        assert_eq!(built.find_bool(CKA_PRIVATE), Some(false));
        assert_eq!(built.find_bool(CKA_TOKEN), Some(true));
    }

    #[test]
    fn merge_without_replace_keeps_existing() {
        let base = AttributeSet::from_attributes([Attribute::bool(CKA_TRUSTED, true)]);
        let overlay = AttributeSet::from_attributes([Attribute::bool(CKA_TRUSTED, false)]);
        let merged = base.merge(&overlay, false);
        assert_eq!(merged.find_bool(CKA_TRUSTED), Some(true));

        let merged = base.merge(&overlay, true);
        assert_eq!(merged.find_bool(CKA_TRUSTED), Some(false));
    }

    #[test]
    fn matches_is_conjunctive() {
        let set = AttributeSet::from_attributes([
            Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE),
            Attribute::bool(CKA_TRUSTED, true),
        ]);
        let template = AttributeSet::from_attributes([Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE)]);
        assert!(set.matches(&template));

        let mismatch =
            AttributeSet::from_attributes([Attribute::ulong(CKA_CLASS, CKO_NSS_TRUST)]);
        assert!(!set.matches(&mismatch));
    }
}
