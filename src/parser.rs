// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver entry points: `parse_memory`/`parse_file` and the per-file
//! bookkeeping (basename, flags, ASN.1 cache) wrapped around the parser
//! driver (§4.G) and trust-policy layer (§4.H).

use crate::asn1::Cache;
use crate::diag::DiagnosticSink;
use crate::driver;
use crate::error::{ParseOutcome, Result};
use crate::index::ObjectIndex;
use crate::path::path_base;
use bytes::Bytes;

/// Per-file parser state: an index to populate, the ASN.1 cache the driver
/// fills in and flushes each call, and the basename/flags recorded for the
/// duration of a single `parse_memory` invocation.
pub struct ParserState {
    pub index: ObjectIndex,
    cache: Cache,
    basename: Option<String>,
    flags: u32,
}

impl ParserState {
    pub fn new() -> Self {
        Self {
            index: ObjectIndex::new(),
            cache: Cache::new(),
            basename: None,
            flags: 0,
        }
    }

    /// Parses `bytes`, previously read from `filename`, with the given
    /// location `flags` (see [`driver::FLAG_ANCHOR`]/[`driver::FLAG_BLACKLIST`]).
    pub fn parse_memory(&mut self, filename: &str, flags: u32, bytes: Bytes) -> Result<ParseOutcome> {
        let basename = path_base(filename).to_string();
        self.basename = Some(basename.clone());
        self.flags = flags;

        let diag = DiagnosticSink::new(&basename);
        let outcome = driver::run(&bytes, &basename, flags, &mut self.index, &mut self.cache, &diag);

        self.cache.flush();
        self.basename = None;
        self.flags = 0;

        outcome
    }

    /// Reads `filename` from disk and parses it. A full read stands in for
    /// the original collaborator's memory-map/unmap pair (out of scope here;
    /// see the REDESIGN FLAGS notes) — adequate for a single-threaded,
    /// non-reentrant ingestion core that need not avoid the initial copy.
    pub fn parse_file(&mut self, filename: &str, flags: u32) -> Result<ParseOutcome> {
        let contents = std::fs::read(filename)?;
        self.parse_memory(filename, flags, Bytes::from(contents))
    }

    pub fn basename(&self) -> Option<&str> {
        self.basename.as_deref()
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::attribute::CKA_CLASS;

    #[test]
    fn parse_memory_resets_basename_and_flags_on_return() {
        let mut state = ParserState::new();
        let der = Bytes::from_static(crate::testutil::SELF_SIGNED_CERT_DER);
        let outcome = state.parse_memory("/etc/pki/anchors/root.crt", driver::FLAG_ANCHOR, der).unwrap();

        assert_eq!(outcome, ParseOutcome::Success);
        assert_eq!(state.basename(), None);
        assert_eq!(state.flags(), 0);
        assert_eq!(state.index.len(), 1);
    }

    #[test]
    fn unrecognized_input_leaves_index_untouched() {
        let mut state = ParserState::new();
        let outcome = state.parse_memory("empty.bin", 0, Bytes::new()).unwrap();
        assert_eq!(outcome, ParseOutcome::Unrecognized);
        assert!(state.index.is_empty());
    }

    #[test]
    fn basename_is_derived_from_the_trailing_path_segment() {
        let mut state = ParserState::new();
        let der = Bytes::from_static(crate::testutil::SELF_SIGNED_CERT_DER);
        // basename is only observable during the call via diagnostics; here we
        // just confirm the call succeeds with a nested path.
        let outcome = state.parse_memory("/a/b/c/cert.der", 0, der).unwrap();
        assert_eq!(outcome, ParseOutcome::Success);
        assert_eq!(state.index.lookup(1).unwrap().find_ulong(CKA_CLASS), Some(crate::attribute::CKO_CERTIFICATE));
    }
}
