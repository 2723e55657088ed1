// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OpenSSL's auxiliary trust structure, appended after a certificate in a
//! `TRUSTED CERTIFICATE` PEM block.
//!
//! ```ASN.1
//! CertAux ::= SEQUENCE {
//!      trust               SEQUENCE OF OBJECT IDENTIFIER OPTIONAL,
//!      reject          [0] SEQUENCE OF OBJECT IDENTIFIER OPTIONAL,
//!      alias               UTF8String OPTIONAL,
//!      keyid               OCTET STRING OPTIONAL,
//!      other               SEQUENCE OF AlgorithmIdentifier OPTIONAL }
//! ```

use crate::rfc5280::AlgorithmIdentifier;
use bcder::{
    decode::{Constructed, DecodeError, Source},
    string::Utf8String,
    OctetString, Oid, Tag,
};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CertAux {
    pub trust: Option<Vec<Oid>>,
    pub reject: Option<Vec<Oid>>,
    pub alias: Option<Utf8String>,
    pub keyid: Option<OctetString>,
    pub other: Option<Vec<AlgorithmIdentifier>>,
}

fn take_opt_oid_sequence<S: Source>(
    cons: &mut Constructed<S>,
) -> Result<Option<Vec<Oid>>, DecodeError<S::Error>> {
    cons.take_opt_sequence(|cons| {
        let mut oids = Vec::new();
        while let Some(oid) = Oid::take_opt_from(cons)? {
            oids.push(oid);
        }
        Ok(oids)
    })
}

impl CertAux {
    pub fn take_from<S: Source>(cons: &mut Constructed<S>) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let trust = take_opt_oid_sequence(cons)?;
            let reject = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                let mut oids = Vec::new();
                while let Some(oid) = Oid::take_opt_from(cons)? {
                    oids.push(oid);
                }
                Ok(oids)
            })?;
            let alias = Utf8String::take_opt_from(cons)?;
            let keyid = OctetString::take_opt_from(cons)?;
            let other = cons.take_opt_sequence(|cons| {
                let mut algorithms = Vec::new();
                while let Some(alg) = AlgorithmIdentifier::take_opt_from(cons)? {
                    algorithms.push(alg);
                }
                Ok(algorithms)
            })?;

            Ok(Self {
                trust,
                reject,
                alias,
                keyid,
                other,
            })
        })
    }
}

/// Locates `needle`'s byte range within `haystack` by pointer identity,
/// returning the inclusive `(start, end)` byte offsets used by the
/// persistence/trust layer's sub-range slicing convention. Only works when
/// `needle` genuinely shares memory with `haystack` (e.g. it was decoded
/// zero-copy from the same buffer).
pub fn sub_range(haystack: &[u8], needle: &[u8]) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }

    let haystack_range = haystack.as_ptr_range();
    let needle_range = needle.as_ptr_range();

    if needle_range.start < haystack_range.start || needle_range.end > haystack_range.end {
        return None;
    }

    let start = needle_range.start as usize - haystack_range.start as usize;
    let end = start + needle.len() - 1;

    Some((start, end))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sub_range_finds_contiguous_slice() {
        let buf = vec![1u8, 2, 3, 4, 5];
        let sub = &buf[1..=3];
        assert_eq!(sub_range(&buf, sub), Some((1, 3)));
    }

    #[test]
    fn sub_range_rejects_foreign_slice() {
        let buf = vec![1u8, 2, 3];
        let other = vec![1u8, 2, 3];
        assert_eq!(sub_range(&buf, &other), None);
    }
}
