// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the driver: native events, outcomes, roles, and the host seam.
//!
//! ## Overview
//!
//! A host delivers [`NativeEvent`]s to the [driver](crate::driver::Driver) and
//! applies the returned [`Outcome`]. The driver reads the element tree and
//! writes visual affordances through the [`Host`] trait.

use core::fmt;

use dragline::types::{EffectAllowed, Modifiers};
use kurbo::{Point, Rect};

use crate::error::DataTransferError;

/// Kinds of native drag events the driver consumes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NativeEventKind {
    /// A drag gesture starts on a source.
    DragStart,
    /// The dragged source reports a pointer tick.
    Drag,
    /// The drag gesture ended on the source.
    DragEnd,
    /// The pointer moves over an element.
    DragOver,
    /// The item was released over an element.
    Drop,
}

impl NativeEventKind {
    /// The host's event name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DragStart => "dragstart",
            Self::Drag => "drag",
            Self::DragEnd => "dragend",
            Self::DragOver => "dragover",
            Self::Drop => "drop",
        }
    }
}

impl fmt::Display for NativeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw drag event as delivered by the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NativeEvent<K> {
    /// What happened.
    pub kind: NativeEventKind,
    /// Element the event originated at; `None` for non-element origins such as
    /// a dragged text selection or the document root.
    pub target: Option<K>,
    /// Pointer position in viewport coordinates.
    pub position: Point,
    /// Modifier keys held.
    pub modifiers: Modifiers,
}

impl<K> NativeEvent<K> {
    /// An event with no modifier keys held.
    pub fn new(kind: NativeEventKind, target: Option<K>, position: Point) -> Self {
        Self {
            kind,
            target,
            position,
            modifiers: Modifiers::empty(),
        }
    }

    /// Replace the modifier keys.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// What the host should do with the native event after the driver handled it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Let the event propagate and run its default action.
    Continue,
    /// Stop propagation to enclosing elements.
    Stop,
    /// Prevent the default action, keep propagating.
    Consume,
    /// Stop propagation and prevent the default action.
    StopAndConsume,
}

impl Outcome {
    /// Whether propagation to enclosing elements should stop.
    pub const fn stops_propagation(self) -> bool {
        matches!(self, Self::Stop | Self::StopAndConsume)
    }

    /// Whether the host's default action should be prevented.
    pub const fn prevents_default(self) -> bool {
        matches!(self, Self::Consume | Self::StopAndConsume)
    }
}

/// The role an element is connected in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    /// Can be picked up and dragged.
    Source,
    /// Can receive a dropped item.
    Target,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "drag source",
            Self::Target => "drop target",
        })
    }
}

/// Pointer affordance for source elements.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Cursor {
    /// Host default.
    #[default]
    Auto,
    /// A connected source at rest.
    Grab,
    /// The source of the operation in progress.
    Grabbing,
}

/// Look up the parent of a node to walk from an event target to the root.
pub trait ParentLookup<K> {
    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// A parent provider for flat hosts where every element is a root.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<K> ParentLookup<K> for NoParent {
    fn parent_of(&self, _: &K) -> Option<K> {
        None
    }
}

/// The environment a [`Driver`](crate::driver::Driver) runs in.
///
/// The tree comes from the [`ParentLookup`] supertrait. Everything else is
/// either a measurement or a write of host-visible state.
pub trait Host<K>: ParentLookup<K> {
    /// Viewport-space bounding box of `node`; `None` when detached or unmeasurable.
    fn bounds_of(&self, node: &K) -> Option<Rect>;

    /// Mark `node` as draggable or not.
    fn set_draggable(&mut self, node: &K, draggable: bool);

    /// Set the pointer affordance of `node`.
    fn set_cursor(&mut self, node: &K, cursor: Cursor);

    /// Start a fresh data transfer for a new drag.
    ///
    /// Called on drag start before any payload write. Payload and allowed
    /// effects from earlier drags must not carry over.
    fn begin_transfer(&mut self) {}

    /// Attach payload data of `format` to the drag in progress.
    fn set_drag_data(&mut self, format: &str, data: &str) -> Result<(), DataTransferError>;

    /// Publish the effects the drag in progress allows.
    fn set_effect_allowed(&mut self, effect: EffectAllowed);
}
