// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A small decode/encode facade over the closed set of schema elements this
//! core needs, plus a per-file cache so a certificate's decoded tree can be
//! reused by the trust-policy layer without a second parse.
//!
//! The upstream grammar this core is modeled on looks up schema elements by
//! name in a runtime-loaded ASN.1 module database. Since every element this
//! core decodes is known at compile time, schemas are represented here as a
//! closed enum dispatching to hand-written `bcder` decoders instead.

pub mod certaux;
pub mod ext_key_usage;

use crate::rfc5280::Certificate;
use bcder::decode::{BytesSource, Constructed};
use bcder::Mode;
use bytes::Bytes;
use certaux::CertAux;
use ext_key_usage::ExtKeyUsageSyntax;
use std::collections::HashMap;

/// The closed set of ASN.1 structures this core decodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SchemaElement {
    Certificate,
    CertAux,
    ExtKeyUsageSyntax,
}

/// A decoded tree, tagged by the schema element it was decoded against.
#[derive(Clone, Debug)]
pub enum Node {
    Certificate(Box<Certificate>),
    CertAux(Box<CertAux>),
    ExtKeyUsageSyntax(Box<ExtKeyUsageSyntax>),
}

impl Node {
    pub fn as_certificate(&self) -> Option<&Certificate> {
        match self {
            Self::Certificate(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_cert_aux(&self) -> Option<&CertAux> {
        match self {
            Self::CertAux(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_ext_key_usage(&self) -> Option<&ExtKeyUsageSyntax> {
        match self {
            Self::ExtKeyUsageSyntax(c) => Some(c),
            _ => None,
        }
    }
}

/// Decodes `bytes` as a DER encoding of `element`. Returns `None` on
/// malformed input, matching the upstream facade's "null on failure"
/// contract — the caller is expected to translate that into an
/// `UNRECOGNIZED`/`FAILURE` outcome as appropriate for the call site.
///
/// `bytes` is taken as a [`Bytes`] rather than a slice so that sub-elements
/// decoded out of it (e.g. CertAux's `keyid`) remain zero-copy slices of the
/// same allocation as the caller's original buffer — this is what makes
/// [`cert_aux_keyid_range`] able to locate `keyid` by pointer identity.
pub fn decode(bytes: Bytes, element: SchemaElement) -> Option<Node> {
    let source = BytesSource::new(bytes);

    match element {
        SchemaElement::Certificate => {
            Constructed::decode(source, Mode::Der, |cons| Certificate::take_from(cons))
                .ok()
                .map(|c| Node::Certificate(Box::new(c)))
        }
        SchemaElement::CertAux => Constructed::decode(source, Mode::Der, |cons| CertAux::take_from(cons))
            .ok()
            .map(|c| Node::CertAux(Box::new(c))),
        SchemaElement::ExtKeyUsageSyntax => {
            Constructed::decode(source, Mode::Der, |cons| ExtKeyUsageSyntax::take_from(cons))
                .ok()
                .map(|c| Node::ExtKeyUsageSyntax(Box::new(c)))
        }
    }
}

/// Encodes an `ExtKeyUsageSyntax` value to DER. The facade only needs to
/// build this one structure; certificates and CertAux are read-only inputs
/// to this core.
pub fn encode_ext_key_usage(syntax: &ExtKeyUsageSyntax) -> Vec<u8> {
    let captured = bcder::Captured::from_values(Mode::Der, syntax.encode_ref());
    captured.as_slice().to_vec()
}

/// Returns the byte length of the first complete DER TLV at the start of
/// `bytes`, or `None` if the header is malformed or truncated.
pub fn tlv_length(bytes: &[u8]) -> Option<usize> {
    let mut pos = 0usize;

    let first = *bytes.get(pos)?;
    pos += 1;
    // High tag number form: low tag bits all set, tag continues in
    // subsequent bytes with the high bit as a continuation flag.
    if first & 0x1f == 0x1f {
        loop {
            let b = *bytes.get(pos)?;
            pos += 1;
            if b & 0x80 == 0 {
                break;
            }
        }
    }

    let length_byte = *bytes.get(pos)?;
    pos += 1;

    let content_len = if length_byte & 0x80 == 0 {
        length_byte as usize
    } else {
        let num_bytes = (length_byte & 0x7f) as usize;
        if num_bytes == 0 {
            // Indefinite length form; not used by DER, reject.
            return None;
        }
        let mut len = 0usize;
        for _ in 0..num_bytes {
            let b = *bytes.get(pos)?;
            pos += 1;
            len = len.checked_shl(8)?.checked_add(b as usize)?;
        }
        len
    };

    let total = pos.checked_add(content_len)?;
    if total > bytes.len() {
        return None;
    }

    Some(total)
}

/// Returns the inclusive `(start, end)` byte range of a CertAux's `keyid`
/// field within `original`, following the spec's `(end - start) + 1`
/// inclusive convention.
pub fn cert_aux_keyid_range(aux: &CertAux, original: &[u8]) -> Option<(usize, usize)> {
    let keyid = aux.keyid.as_ref()?;
    certaux::sub_range(original, keyid.clone().into_bytes().as_ref())
}

/// A process-lifetime-scoped (in practice, per-file) cache keyed by schema
/// element and the identity of the raw bytes decoded, so the trust-policy
/// layer can reuse a certificate's tree without re-parsing it.
#[derive(Default)]
pub struct Cache {
    entries: HashMap<(SchemaElement, Vec<u8>), Node>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self, element: SchemaElement, bytes: &[u8], node: Node) {
        self.entries.insert((element, bytes.to_vec()), node);
    }

    pub fn get(&self, element: SchemaElement, bytes: &[u8]) -> Option<&Node> {
        self.entries.get(&(element, bytes.to_vec()))
    }

    pub fn flush(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tlv_length_short_form() {
        // SEQUENCE { INTEGER 1 } — 02 01 01 wrapped: 30 03 02 01 01
        let der = [0x30, 0x03, 0x02, 0x01, 0x01];
        assert_eq!(tlv_length(&der), Some(5));
    }

    #[test]
    fn tlv_length_long_form() {
        let mut der = vec![0x30, 0x82, 0x01, 0x00];
        der.extend(vec![0u8; 0x100]);
        assert_eq!(tlv_length(&der), Some(4 + 0x100));
    }

    #[test]
    fn tlv_length_truncated_is_none() {
        let der = [0x30, 0x05, 0x02, 0x01];
        assert_eq!(tlv_length(&der), None);
    }

    #[test]
    fn cache_round_trips() {
        let mut cache = Cache::new();
        let bytes = vec![1u8, 2, 3];
        cache.take(
            SchemaElement::ExtKeyUsageSyntax,
            &bytes,
            Node::ExtKeyUsageSyntax(Box::new(ExtKeyUsageSyntax::new(vec![]))),
        );
        assert!(cache.get(SchemaElement::ExtKeyUsageSyntax, &bytes).is_some());
        cache.flush();
        assert!(cache.get(SchemaElement::ExtKeyUsageSyntax, &bytes).is_none());
    }
}
