// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The format-detecting parser driver: tries the persistence grammar, then
//! PEM envelope scanning, then a raw DER certificate, in that fixed order.

use crate::asn1::{self, Node, SchemaElement};
use crate::attribute::{Attribute, AttributeSet, CKA_CERTIFICATE_TYPE, CKA_CLASS, CKA_ID, CKA_LABEL, CKA_MODIFIABLE, CKC_X_509, CKO_CERTIFICATE};
use crate::diag::DiagnosticSink;
use crate::error::{ParseOutcome, Result};
use crate::index::ObjectIndex;
use crate::pem::{pem_parse, PemBlock};
use crate::persist;
use crate::rfc5280::Certificate;
use crate::trust::{self, Location};
use crate::x509::calc_keyid;
use bytes::Bytes;

/// Bits of `ParserState::flags`: governs how `sink_object` reconciles trust.
pub const FLAG_ANCHOR: u32 = 1 << 0;
pub const FLAG_BLACKLIST: u32 = 1 << 1;

fn location_from_flags(flags: u32) -> Location {
    let anchor = flags & FLAG_ANCHOR != 0;
    let blacklist = flags & FLAG_BLACKLIST != 0;
    assert!(
        !(anchor && blacklist),
        "parser flags must not set both ANCHOR and BLACKLIST"
    );
    if anchor {
        Location::Anchor
    } else if blacklist {
        Location::Blacklist
    } else {
        Location::Neither
    }
}

fn decode_certificate(cache: &mut asn1::Cache, der: &Bytes) -> Option<Box<Certificate>> {
    match asn1::decode(der.clone(), SchemaElement::Certificate)? {
        Node::Certificate(cert) => {
            cache.take(SchemaElement::Certificate, der, Node::Certificate(cert.clone()));
            Some(cert)
        }
        _ => None,
    }
}

fn build_certificate_attrs(der: &Bytes, keyid: Option<[u8; 20]>) -> AttributeSet {
    let mut attrs = vec![
        Attribute::ulong(CKA_CLASS, CKO_CERTIFICATE),
        Attribute::bool(CKA_MODIFIABLE, false),
        Attribute::ulong(CKA_CERTIFICATE_TYPE, CKC_X_509),
        Attribute::new(crate::attribute::CKA_VALUE, der.to_vec()),
    ];
    if let Some(id) = keyid {
        attrs.push(Attribute::new(CKA_ID, id.to_vec()));
    }
    AttributeSet::from_attributes(attrs)
}

/// §4.G.1: decode a bare DER certificate and sink it. Returns the key
/// identifier computed for it (`None` if decode failed).
fn sink_raw_certificate(
    der: &Bytes,
    index: &mut ObjectIndex,
    cache: &mut asn1::Cache,
    diag: &DiagnosticSink,
    flags: u32,
) -> Result<Option<[u8; 20]>> {
    let Some(cert) = decode_certificate(cache, der) else {
        return Ok(None);
    };

    let keyid = Some(calc_keyid(&cert));
    let attrs = build_certificate_attrs(der, keyid);
    trust::sink_object(index, attrs, location_from_flags(flags), diag)?;
    Ok(keyid)
}

/// §4.G.2: a `TRUSTED CERTIFICATE` PEM block — a raw certificate DER
/// immediately followed by an `OPENSSL.CertAux` DER.
fn sink_trusted_certificate(
    der: &Bytes,
    index: &mut ObjectIndex,
    cache: &mut asn1::Cache,
    diag: &DiagnosticSink,
    flags: u32,
) -> Result<()> {
    let Some(cert_len) = asn1::tlv_length(der) else {
        diag.warn("TRUSTED CERTIFICATE block: malformed leading certificate TLV");
        return Ok(());
    };
    if cert_len > der.len() {
        diag.warn("TRUSTED CERTIFICATE block: truncated certificate TLV");
        return Ok(());
    }

    let cert_der = der.slice(0..cert_len);
    let aux_der = der.slice(cert_len..);

    let Some(cert) = decode_certificate(cache, &cert_der) else {
        diag.warn("TRUSTED CERTIFICATE block: certificate did not decode");
        return Ok(());
    };
    let Some(Node::CertAux(aux)) = asn1::decode(aux_der.clone(), SchemaElement::CertAux) else {
        diag.warn("TRUSTED CERTIFICATE block: CertAux did not decode");
        return Ok(());
    };

    let keyid = calc_keyid(&cert);
    let mut base = build_certificate_attrs(&cert_der, Some(keyid));

    if let Some(alias) = &aux.alias {
        base = AttributeSet::build(
            &base,
            [Attribute::new(CKA_LABEL, alias.to_string().into_bytes())],
        );
    }

    let (staples, trusted_override) = trust::stapled_attrs_for_cert_aux(&aux, Some(&keyid), aux_der.as_ref());

    if let Some(trusted) = trusted_override {
        base = AttributeSet::build(
            &base,
            [
                Attribute::bool(crate::attribute::CKA_TRUSTED, trusted),
                Attribute::bool(crate::attribute::CKA_X_DISTRUSTED, !trusted),
            ],
        );
    }

    index.batch();
    trust::sink_object(index, base, location_from_flags(flags), diag)?;
    for staple in staples {
        trust::sink_object(index, staple, location_from_flags(flags), diag)?;
    }
    index.finish();

    Ok(())
}

fn dispatch_pem_block(
    block: PemBlock,
    index: &mut ObjectIndex,
    cache: &mut asn1::Cache,
    diag: &DiagnosticSink,
    flags: u32,
) -> Result<()> {
    match block.block_type.as_str() {
        "CERTIFICATE" => {
            let der = Bytes::from(block.data);
            if sink_raw_certificate(&der, index, cache, diag, flags)?.is_none() {
                diag.warn("PEM CERTIFICATE block did not decode as a certificate");
            }
            Ok(())
        }
        "TRUSTED CERTIFICATE" => {
            let der = Bytes::from(block.data);
            sink_trusted_certificate(&der, index, cache, diag, flags)
        }
        other => {
            diag.info(format!("ignoring PEM block of type {other}"));
            Ok(())
        }
    }
}

fn try_persist(
    text: &str,
    basename: &str,
    index: &mut ObjectIndex,
    diag: &DiagnosticSink,
    flags: u32,
) -> Result<ParseOutcome> {
    if !persist::persist_magic(text) {
        return Ok(ParseOutcome::Unrecognized);
    }

    let sets = match persist::read(basename, text) {
        Ok(sets) => sets,
        Err(e) => {
            diag.warn(e);
            return Ok(ParseOutcome::Failure);
        }
    };

    index.batch();
    for set in sets {
        trust::sink_object(index, set, location_from_flags(flags), diag)?;
    }
    index.finish();

    Ok(ParseOutcome::Success)
}

fn try_pem(
    text: &str,
    index: &mut ObjectIndex,
    cache: &mut asn1::Cache,
    diag: &DiagnosticSink,
    flags: u32,
) -> Result<ParseOutcome> {
    let mut first_error = None;

    index.batch();
    let count = pem_parse(text, |block| {
        if first_error.is_some() {
            return;
        }
        if let Err(e) = dispatch_pem_block(block, index, cache, diag, flags) {
            first_error = Some(e);
        }
    });
    index.finish();

    if let Some(e) = first_error {
        return Err(e);
    }
    if count == 0 {
        return Ok(ParseOutcome::Unrecognized);
    }
    Ok(ParseOutcome::Success)
}

fn try_raw_der(
    der: &Bytes,
    index: &mut ObjectIndex,
    cache: &mut asn1::Cache,
    diag: &DiagnosticSink,
    flags: u32,
) -> Result<ParseOutcome> {
    index.batch();
    let result = sink_raw_certificate(der, index, cache, diag, flags);
    index.finish();

    match result? {
        Some(_) => Ok(ParseOutcome::Success),
        None => Ok(ParseOutcome::Unrecognized),
    }
}

/// Runs the fixed `{persist, pem, raw-der}` sequence over `bytes`, stopping
/// at the first non-`Unrecognized` result.
pub fn run(
    bytes: &Bytes,
    basename: &str,
    flags: u32,
    index: &mut ObjectIndex,
    cache: &mut asn1::Cache,
    diag: &DiagnosticSink,
) -> Result<ParseOutcome> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let outcome = try_persist(text, basename, index, diag, flags)?;
        if outcome != ParseOutcome::Unrecognized {
            return Ok(outcome);
        }

        let outcome = try_pem(text, index, cache, diag, flags)?;
        if outcome != ParseOutcome::Unrecognized {
            return Ok(outcome);
        }
    }

    try_raw_der(bytes, index, cache, diag, flags)
}
