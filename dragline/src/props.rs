// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived-state snapshot handed to the binding layer.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::types::EdgeState;

/// A single derived value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropValue {
    /// `isDragging` or `isOver`.
    Bool(bool),
    /// `isOverEdge`.
    Edges(EdgeState),
}

impl PropValue {
    /// The boolean, if this is a flag.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            Self::Edges(_) => None,
        }
    }

    /// The edge state, if this is one.
    pub fn as_edges(self) -> Option<EdgeState> {
        match self {
            Self::Edges(e) => Some(e),
            Self::Bool(_) => None,
        }
    }
}

/// Named derived values, in the order `isDragging`, `isOver`, `isOverEdge`.
///
/// Only the values relevant to the handler's configuration are present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Props {
    entries: Vec<(Cow<'static, str>, PropValue)>,
}

impl Props {
    pub(crate) fn push(&mut self, name: Cow<'static, str>, value: PropValue) {
        self.entries.push((name, value));
    }

    /// Look up a value by its (possibly remapped) name.
    pub fn get(&self, name: &str) -> Option<PropValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Whether a value named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PropValue)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_ref(), *v))
    }

    /// Number of values present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no value is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
