// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The object index: an insertion-order-preserving map from opaque handles to
//! attribute sets, with deferred-notification batching.

use crate::attribute::AttributeSet;
use crate::error::{Result, TrustParserError};
use std::collections::HashMap;

pub type Handle = u64;

/// Receives notifications when the index gains or replaces an object. Held
/// behind a trait so the driver can plug in downstream consumers (e.g. a
/// PKCS#11 session's change-notification machinery) without the index
/// depending on them.
pub trait ChangeSink {
    fn object_changed(&mut self, handle: Handle);
}

/// An index that discards notifications; the default when no sink is wired
/// in.
pub struct NullSink;

impl ChangeSink for NullSink {
    fn object_changed(&mut self, _handle: Handle) {}
}

#[derive(Default)]
pub struct ObjectIndex {
    objects: HashMap<Handle, AttributeSet>,
    order: Vec<Handle>,
    next_handle: Handle,
    batch_depth: u32,
    pending: Vec<Handle>,
}

impl ObjectIndex {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            ..Default::default()
        }
    }

    /// If `handle == 0`, inserts `attrs` under a freshly allocated handle and
    /// returns it. Otherwise overwrites the object at `handle` and returns it
    /// unchanged.
    pub fn replace(&mut self, handle: Handle, attrs: AttributeSet) -> Result<Handle> {
        let handle = if handle == 0 {
            let h = self.next_handle;
            self.next_handle = self
                .next_handle
                .checked_add(1)
                .ok_or(TrustParserError::GeneralError)?;
            self.order.push(h);
            h
        } else {
            handle
        };

        self.objects.insert(handle, attrs);
        self.notify(handle);

        Ok(handle)
    }

    fn notify(&mut self, handle: Handle) {
        if self.batch_depth > 0 {
            self.pending.push(handle);
        }
    }

    pub fn lookup(&self, handle: Handle) -> Option<&AttributeSet> {
        self.objects.get(&handle)
    }

    /// Returns the `index`-th (0-based) handle whose object matches
    /// `template`, in insertion order. A negative `index` (expressed here as
    /// `None`) means "first match".
    pub fn find(&self, template: &AttributeSet, index: Option<usize>) -> Option<Handle> {
        let mut matches = self
            .order
            .iter()
            .filter(|h| self.objects.get(h).map(|o| o.matches(template)).unwrap_or(false));

        match index {
            None => matches.next().copied(),
            Some(n) => matches.nth(n).copied(),
        }
    }

    /// Enters a batched scope; notifications are deferred until the
    /// outermost [`finish`](Self::finish).
    pub fn batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Leaves a batched scope. Returns the handles changed during the scope
    /// once the outermost `batch` is closed; returns an empty vec otherwise.
    pub fn finish(&mut self) -> Vec<Handle> {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            std::mem::take(&mut self.pending)
        } else {
            Vec::new()
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
