// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection registry: which element is connected in which role, to which handler.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use dragline::protocol::HandlerRef;

use crate::error::DragError;
use crate::types::{Cursor, Host, Role};

/// A handler connected to one element in one role.
pub struct Connection<K> {
    role: Role,
    handler: HandlerRef<K>,
}

impl<K> Connection<K> {
    /// The role this connection serves.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The connected handler.
    pub fn handler(&self) -> &HandlerRef<K> {
        &self.handler
    }

    /// Mark `node` interactive on the host.
    pub(crate) fn setup<H: Host<K>>(&self, node: &K, host: &mut H) {
        if self.role == Role::Source {
            host.set_draggable(node, true);
            host.set_cursor(node, Cursor::Grab);
        }
    }

    /// Undo [`setup`](Self::setup).
    pub(crate) fn teardown<H: Host<K>>(&self, node: &K, host: &mut H) {
        if self.role == Role::Source {
            host.set_draggable(node, false);
            host.set_cursor(node, Cursor::Auto);
        }
    }
}

impl<K> fmt::Debug for Connection<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Per-role maps from element to [`Connection`].
///
/// Each element is connected at most once per role.
pub struct Registry<K> {
    sources: BTreeMap<K, Connection<K>>,
    targets: BTreeMap<K, Connection<K>>,
}

impl<K: fmt::Debug> fmt::Debug for Registry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K> Default for Registry<K> {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            targets: BTreeMap::new(),
        }
    }
}

impl<K: Copy + Ord> Registry<K> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, role: Role) -> &BTreeMap<K, Connection<K>> {
        match role {
            Role::Source => &self.sources,
            Role::Target => &self.targets,
        }
    }

    fn map_mut(&mut self, role: Role) -> &mut BTreeMap<K, Connection<K>> {
        match role {
            Role::Source => &mut self.sources,
            Role::Target => &mut self.targets,
        }
    }

    /// Connect `handler` to `node` in `role`.
    ///
    /// Fails with [`DragError::DuplicateConnection`] if `node` is already
    /// connected in that role; the existing connection is kept.
    pub fn register(
        &mut self,
        role: Role,
        node: K,
        handler: HandlerRef<K>,
    ) -> Result<&Connection<K>, DragError<K>> {
        let map = self.map_mut(role);
        if map.contains_key(&node) {
            return Err(DragError::DuplicateConnection { node, role });
        }
        Ok(map.entry(node).or_insert(Connection { role, handler }))
    }

    /// Remove the connection of `node` in `role`, if any.
    pub fn unregister(&mut self, role: Role, node: &K) -> Option<Connection<K>> {
        self.map_mut(role).remove(node)
    }

    /// Whether `node` is connected in `role`.
    pub fn contains(&self, role: Role, node: &K) -> bool {
        self.map(role).contains_key(node)
    }

    /// The handler connected to `node` in `role`.
    pub fn handler(&self, role: Role, node: &K) -> Option<HandlerRef<K>> {
        self.map(role).get(node).map(|c| Rc::clone(&c.handler))
    }

    /// The handler connected to `node` as a source.
    pub fn source(&self, node: &K) -> Option<HandlerRef<K>> {
        self.handler(Role::Source, node)
    }

    /// The handler connected to `node` as a target.
    pub fn target(&self, node: &K) -> Option<HandlerRef<K>> {
        self.handler(Role::Target, node)
    }

    /// Whether `node` is connected as a source.
    pub fn has_source(&self, node: &K) -> bool {
        self.contains(Role::Source, node)
    }

    /// Whether `node` is connected as a target.
    pub fn has_target(&self, node: &K) -> bool {
        self.contains(Role::Target, node)
    }

    /// Number of connections across both roles.
    pub fn len(&self) -> usize {
        self.sources.len() + self.targets.len()
    }

    /// Whether nothing is connected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every connection, sources first.
    pub(crate) fn drain(&mut self) -> Vec<(K, Connection<K>)> {
        let sources = core::mem::take(&mut self.sources);
        let targets = core::mem::take(&mut self.targets);
        sources.into_iter().chain(targets).collect()
    }
}
