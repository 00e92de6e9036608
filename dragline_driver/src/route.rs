// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bubbling resolution over the host tree.
//!
//! A native event fires at the deepest element under the pointer and bubbles
//! toward the root. Connected elements stop propagation, so the element that
//! handles an event is the innermost connected one on that path.

use alloc::vec::Vec;

use crate::types::ParentLookup;

/// The innermost node on the path from `target` to the root for which
/// `connected` holds.
pub fn resolve<K: Copy>(
    target: K,
    parents: &impl ParentLookup<K>,
    mut connected: impl FnMut(&K) -> bool,
) -> Option<K> {
    let mut cur = target;
    // Caller ensures acyclic ancestry.
    loop {
        if connected(&cur) {
            return Some(cur);
        }
        cur = parents.parent_of(&cur)?;
    }
}

/// Root→target path of `target`.
pub fn path_to_root<K: Copy>(target: K, parents: &impl ParentLookup<K>) -> Vec<K> {
    let mut out = Vec::new();
    let mut cur = target;
    loop {
        out.push(cur);
        match parents.parent_of(&cur) {
            Some(p) => cur = p,
            None => break,
        }
    }
    out.reverse();
    out
}
