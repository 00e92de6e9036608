// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canonical driver → handler protocol.
//!
//! ## Overview
//!
//! A driver normalizes whatever its host delivers into calls on these traits.
//! Calls are role-scoped: an element connected as a source only ever sees
//! [`SourceHandler`] calls and an element connected as a target only ever sees
//! [`TargetHandler`] calls. An element connected in both roles shares one
//! handler between them.
//!
//! ## Ordering guarantees
//!
//! A conforming driver never emits `on_drag` or `on_drag_end` without a
//! preceding `on_drag_start`, never emits a second `on_drag_start` while one is
//! open, and for a single native tick emits `on_drag_leave` (old target) →
//! `on_drag_enter` (new target) → `on_drag_over` (new target). Every
//! `on_drag_enter` is matched by exactly one `on_drag_leave` before the
//! operation ends.

use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Point;

use crate::types::{DragStatus, DropEffect, EffectAllowed};

/// A point event delivered against `node`.
///
/// Used for `drag_start`, `drag`, `drag_end`, `drag_enter` and `drag_leave`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragPoint<K> {
    /// Element the event is delivered against.
    pub node: K,
    /// Pointer position in viewport coordinates.
    pub position: Point,
}

/// A hover tick delivered against a target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DragOverEvent<K> {
    /// Target element.
    pub node: K,
    /// Pointer status relative to the target, plus modifier keys.
    pub status: DragStatus,
    /// Effects the dragged source allows.
    pub effect_allowed: EffectAllowed,
}

/// A drop delivered against a target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DropEvent<K> {
    /// Target element.
    pub node: K,
    /// Pointer status relative to the target, plus modifier keys.
    pub status: DragStatus,
}

/// Source-role half of the protocol.
pub trait SourceHandler<K> {
    /// Whether this handler is meant to be connected as a source.
    fn handles_source(&self) -> bool {
        true
    }

    /// A drag operation starts on this source.
    ///
    /// Returns the effects allowed for the item; `None` lets the driver fall
    /// back to [`EffectAllowed::ALL`].
    fn on_drag_start(&mut self, event: DragPoint<K>) -> Option<EffectAllowed>;

    /// The pointer moved while this source is being dragged.
    fn on_drag(&mut self, event: DragPoint<K>);

    /// The operation started on this source ended.
    fn on_drag_end(&mut self, event: DragPoint<K>);
}

/// Target-role half of the protocol.
pub trait TargetHandler<K> {
    /// Whether this handler is meant to be connected as a target.
    fn handles_target(&self) -> bool {
        true
    }

    /// The pointer entered this target.
    fn on_drag_enter(&mut self, event: DragPoint<K>);

    /// The pointer is over this target; returns the effect a drop would have.
    fn on_drag_over(&mut self, event: DragOverEvent<K>) -> DropEffect;

    /// The pointer left this target, or the operation is being cleaned up.
    fn on_drag_leave(&mut self, event: DragPoint<K>);

    /// The item was dropped on this target.
    fn on_drop(&mut self, event: DropEvent<K>);
}

/// A handler usable in both roles.
///
/// Implemented for every type that implements [`SourceHandler`] and
/// [`TargetHandler`]; drivers store handlers as `dyn DragHandler<K>`.
pub trait DragHandler<K>: SourceHandler<K> + TargetHandler<K> {}

impl<K, H: SourceHandler<K> + TargetHandler<K> + ?Sized> DragHandler<K> for H {}

/// Shared handle to a connected handler.
///
/// The binding layer keeps one clone to read derived state, the driver keeps
/// another for each role the handler is connected in.
pub type HandlerRef<K> = Rc<RefCell<dyn DragHandler<K>>>;
