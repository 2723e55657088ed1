// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PEM envelope scanning.
//!
//! This is a hand-rolled scanner rather than a wrapper around a generic PEM
//! crate: a malformed block (mismatched `BEGIN`/`END` type, bad base64) must
//! be skipped without aborting the scan of the rest of the stream, which is
//! finer-grained fault isolation than a whole-document PEM parser gives.

const BEGIN_PREFIX: &str = "-----BEGIN ";
const END_PREFIX: &str = "-----END ";
const MARKER_SUFFIX: &str = "-----";

#[derive(Debug)]
pub struct PemBlock {
    pub block_type: String,
    pub data: Vec<u8>,
}

/// Scans `text` for well-formed PEM blocks, invoking `on_block` for each one
/// whose `END` type matches its `BEGIN` type and whose payload is valid
/// base64. Malformed blocks are skipped, not fatal. Returns the number of
/// blocks successfully emitted.
pub fn pem_parse(text: &str, mut on_block: impl FnMut(PemBlock)) -> usize {
    let mut count = 0;
    let mut rest = text;

    while let Some(begin_at) = rest.find(BEGIN_PREFIX) {
        let after_begin_prefix = &rest[begin_at + BEGIN_PREFIX.len()..];
        let Some(type_end) = after_begin_prefix.find(MARKER_SUFFIX) else {
            break;
        };
        let block_type = &after_begin_prefix[..type_end];
        let body_start = begin_at + BEGIN_PREFIX.len() + type_end + MARKER_SUFFIX.len();
        let body_start = skip_to_next_line(rest, body_start);

        let end_marker = format!("{}{}{}", END_PREFIX, block_type, MARKER_SUFFIX);
        let Some(end_at_rel) = rest[body_start..].find(END_PREFIX) else {
            break;
        };
        let end_at = body_start + end_at_rel;

        if !rest[end_at..].starts_with(&end_marker) {
            // Mismatched or malformed END marker: skip past this BEGIN and
            // keep scanning — don't let one bad block stop the rest.
            rest = &rest[begin_at + BEGIN_PREFIX.len()..];
            continue;
        }

        let payload: String = rest[body_start..end_at]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if let Ok(data) = base64::decode(&payload) {
            on_block(PemBlock {
                block_type: block_type.to_string(),
                data,
            });
            count += 1;
        }

        let consumed_to = end_at + end_marker.len();
        rest = &rest[consumed_to..];
    }

    count
}

fn skip_to_next_line(text: &str, from: usize) -> usize {
    match text[from..].find('\n') {
        Some(idx) => from + idx + 1,
        None => text.len(),
    }
}

/// Formats `data` as a PEM block of type `block_type`, for use by tests
/// exercising the round-trip property.
#[cfg(test)]
pub fn pem_format(block_type: &str, data: &[u8]) -> String {
    let encoded = base64::encode(data);
    let mut out = format!("-----BEGIN {}-----\n", block_type);
    for chunk in encoded.as_bytes().chunks(64) {
        out.push_str(std::str::from_utf8(chunk).unwrap());
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", block_type));
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_a_single_block() {
        let data = b"hello trust store";
        let pem = pem_format("CERTIFICATE", data);

        let mut blocks = Vec::new();
        let count = pem_parse(&pem, |b| blocks.push(b));

        assert_eq!(count, 1);
        assert_eq!(blocks[0].block_type, "CERTIFICATE");
        assert_eq!(blocks[0].data, data);
    }

    #[test]
    fn mismatched_end_type_is_skipped() {
        let text = "-----BEGIN CERTIFICATE-----\naGVsbG8=\n-----END FOOBAR-----\n";
        let mut blocks = Vec::new();
        let count = pem_parse(text, |b| blocks.push(b));
        assert_eq!(count, 0);
        assert!(blocks.is_empty());
    }

    #[test]
    fn skips_malformed_block_but_continues_scanning() {
        let good = pem_format("CERTIFICATE", b"second block");
        let text = format!(
            "-----BEGIN CERTIFICATE-----\naGVsbG8=\n-----END WRONG-----\n{}",
            good
        );

        let mut blocks = Vec::new();
        let count = pem_parse(&text, |b| blocks.push(b));
        assert_eq!(count, 1);
        assert_eq!(blocks[0].data, b"second block");
    }

    #[test]
    fn empty_stream_yields_zero_blocks() {
        let mut blocks = Vec::new();
        let count = pem_parse("", |b| blocks.push(b));
        assert_eq!(count, 0);
    }

    #[test]
    fn multiple_blocks_are_all_emitted() {
        let text = format!(
            "{}{}",
            pem_format("CERTIFICATE", b"one"),
            pem_format("CERTIFICATE", b"two")
        );
        let mut blocks = Vec::new();
        pem_parse(&text, |b| blocks.push(b));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].data, b"one");
        assert_eq!(blocks[1].data, b"two");
    }
}
