// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory [`Host`]: a tree of rectangles with recorded host writes.
//!
//! Useful for headless drivers, demos, and tests. Elements are addressed by
//! generational [`NodeId`]s; removing an element frees its slot, and a later
//! insert into that slot yields a distinct id.

use alloc::string::String;
use alloc::vec::Vec;

use dragline::types::EffectAllowed;
use kurbo::{Point, Rect};

use crate::error::DataTransferError;
use crate::route::path_to_root;
use crate::types::{Cursor, Host, ParentLookup};

/// Identifier of an element in a [`MemoryHost`].
///
/// A slot index paired with the slot's generation. Stale ids never alias a
/// different live element because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Element {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bounds: Rect,
    draggable: bool,
    cursor: Cursor,
}

/// In-memory element tree implementing [`Host<NodeId>`](Host).
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    elements: Vec<Option<Element>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    rejected_formats: Vec<String>,
    drag_data: Vec<(String, String)>,
    effect_allowed: Option<EffectAllowed>,
}

impl MemoryHost {
    /// An empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element with viewport-space `bounds` as a child of `parent`
    /// (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<NodeId>, bounds: Rect) -> NodeId {
        let element = |generation| Element {
            generation,
            parent: None,
            children: Vec::new(),
            bounds,
            draggable: false,
            cursor: Cursor::Auto,
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.elements[idx] = Some(element(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.elements.push(Some(element(generation)));
            self.generations.push(generation);
            (self.elements.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices."
        )]
        let id = NodeId(idx as u32, generation);
        if let Some(p) = parent {
            self.link(id, p);
        }
        id
    }

    /// Remove an element and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        let Some(element) = self.get(id) else {
            return;
        };
        let parent = element.parent;
        let children = element.children.clone();
        if let Some(p) = parent {
            self.unlink(id, p);
        }
        for child in children {
            self.remove(child);
        }
        self.elements[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` under `new_parent` (or make it a root), keeping its bounds.
    ///
    /// Ignored when either node is dead, or when `new_parent` is `id` or one
    /// of its descendants.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        let Some(parent) = self.get(id).map(|e| e.parent) else {
            return;
        };
        if let Some(p) = new_parent
            && (!self.is_alive(p) || path_to_root(p, self).contains(&id))
        {
            return;
        }
        if let Some(p) = parent {
            self.unlink(id, p);
        }
        if let Some(p) = new_parent {
            self.link(id, p);
        }
    }

    /// Update the viewport-space bounds of `id`.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(e) = self.get_mut(id) {
            e.bounds = bounds;
        }
    }

    /// Whether `id` refers to a live element.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` is currently marked draggable.
    pub fn is_draggable(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|e| e.draggable)
    }

    /// Current cursor of `id`, if it is live.
    pub fn cursor(&self, id: NodeId) -> Option<Cursor> {
        self.get(id).map(|e| e.cursor)
    }

    /// Make every later payload write of `format` fail.
    pub fn reject_format(&mut self, format: impl Into<String>) {
        self.rejected_formats.push(format.into());
    }

    /// Payload writes accepted for the current drag, as `(format, data)` pairs.
    pub fn drag_data(&self) -> &[(String, String)] {
        &self.drag_data
    }

    /// Most recently published allowed effects.
    pub fn effect_allowed(&self) -> Option<EffectAllowed> {
        self.effect_allowed
    }

    /// Deepest live element whose bounds contain `pt`.
    ///
    /// Among elements at equal depth, the most recently inserted wins.
    pub fn hit_test(&self, pt: Point) -> Option<NodeId> {
        let mut best: Option<(usize, NodeId)> = None;
        for (idx, slot) in self.elements.iter().enumerate() {
            let Some(e) = slot else { continue };
            if !e.bounds.contains(pt) {
                continue;
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices."
            )]
            let id = NodeId(idx as u32, e.generation);
            let depth = path_to_root(id, self).len();
            if best.is_none_or(|(d, b)| depth > d || (depth == d && newer(id, b))) {
                best = Some((depth, id));
            }
        }
        best.map(|(_, id)| id)
    }

    fn get(&self, id: NodeId) -> Option<&Element> {
        self.elements
            .get(id.idx())
            .and_then(|slot| slot.as_ref())
            .filter(|e| e.generation == id.1)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.elements
            .get_mut(id.idx())
            .and_then(|slot| slot.as_mut())
            .filter(|e| e.generation == id.1)
    }

    fn link(&mut self, id: NodeId, parent: NodeId) {
        let Some(p) = self.get_mut(parent) else {
            return;
        };
        p.children.push(id);
        if let Some(e) = self.get_mut(id) {
            e.parent = Some(parent);
        }
    }

    fn unlink(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(e) = self.get_mut(id) {
            e.parent = None;
        }
    }
}

fn newer(a: NodeId, b: NodeId) -> bool {
    (a.1 > b.1) || (a.1 == b.1 && a.0 > b.0)
}

impl ParentLookup<NodeId> for MemoryHost {
    fn parent_of(&self, node: &NodeId) -> Option<NodeId> {
        self.get(*node).and_then(|e| e.parent)
    }
}

impl Host<NodeId> for MemoryHost {
    fn bounds_of(&self, node: &NodeId) -> Option<Rect> {
        self.get(*node).map(|e| e.bounds)
    }

    fn set_draggable(&mut self, node: &NodeId, draggable: bool) {
        if let Some(e) = self.get_mut(*node) {
            e.draggable = draggable;
        }
    }

    fn set_cursor(&mut self, node: &NodeId, cursor: Cursor) {
        if let Some(e) = self.get_mut(*node) {
            e.cursor = cursor;
        }
    }

    fn begin_transfer(&mut self) {
        self.drag_data.clear();
        self.effect_allowed = None;
    }

    fn set_drag_data(&mut self, format: &str, data: &str) -> Result<(), DataTransferError> {
        if self.rejected_formats.iter().any(|f| f == format) {
            return Err(DataTransferError::new(format));
        }
        self.drag_data.push((format.into(), data.into()));
        Ok(())
    }

    fn set_effect_allowed(&mut self, effect: EffectAllowed) {
        self.effect_allowed = Some(effect);
    }
}
