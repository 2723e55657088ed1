// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Diagnostic reporting for the parser, with a process-wide quiet/loud toggle
//! so tests that exercise expected-failure paths don't spam the test runner.

use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress diagnostic output. Intended for tests that deliberately feed
/// malformed input and don't want the resulting warnings on stderr.
pub fn set_quiet() {
    QUIET.store(true, Ordering::SeqCst);
}

/// Restore normal diagnostic output.
pub fn set_loud() {
    QUIET.store(false, Ordering::SeqCst);
}

fn is_quiet() -> bool {
    QUIET.load(Ordering::SeqCst)
}

/// Emits basename-prefixed diagnostics through the `log` crate, honoring the
/// quiet/loud toggle.
pub struct DiagnosticSink<'a> {
    basename: &'a str,
}

impl<'a> DiagnosticSink<'a> {
    pub fn new(basename: &'a str) -> Self {
        Self { basename }
    }

    pub fn warn(&self, message: impl std::fmt::Display) {
        if !is_quiet() {
            log::warn!("{}: {}", self.basename, message);
        }
    }

    pub fn info(&self, message: impl std::fmt::Display) {
        if !is_quiet() {
            log::info!("{}: {}", self.basename, message);
        }
    }
}
