// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversions between fixed-width Unicode encodings and UTF-8, and UTF-8
//! validation, as used by the persistence grammar's string values.

/// Decodes big-endian UCS-2 (one code unit per BMP scalar, no surrogates) to
/// UTF-8. Returns `None` on truncated input (odd byte length) or an
/// unassigned/surrogate code point.
pub fn utf8_for_ucs2be(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }

    let mut out = String::with_capacity(bytes.len() / 2);

    for chunk in bytes.chunks_exact(2) {
        let unit = u16::from_be_bytes([chunk[0], chunk[1]]);
        let c = char::from_u32(unit as u32)?;
        out.push(c);
    }

    Some(out)
}

/// Decodes big-endian UCS-4 to UTF-8. Returns `None` on truncated input or a
/// surrogate/out-of-range scalar value.
pub fn utf8_for_ucs4be(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }

    let mut out = String::with_capacity(bytes.len() / 4);

    for chunk in bytes.chunks_exact(4) {
        let unit = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let c = char::from_u32(unit)?;
        out.push(c);
    }

    Some(out)
}

/// True iff `bytes` is a well-formed UTF-8 sequence in its entirety.
pub fn utf8_validate(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok()
}
