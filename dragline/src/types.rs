// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core value types: effects, modifier keys, pointer status, edge state, and source data.
//!
//! ## Overview
//!
//! These types describe what flows through the drag protocol.
//! They are produced by a driver (see `dragline_driver`) and consumed by
//! [`Handler`](crate::handler::Handler) and by user callbacks.
//!
//! Geometry uses Kurbo directly: a pointer position is a [`Point`] in viewport
//! coordinates and the size of a target is a [`Size`].

use core::fmt;

use kurbo::{Point, Size, Vec2};

/// The single effect chosen for a source/target pairing.
///
/// Returned by [`TargetHandler::on_drag_over`](crate::protocol::TargetHandler::on_drag_over)
/// and recorded by the driver to decide whether a later drop is honored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum DropEffect {
    /// The target refuses the item. A drop will not reach `on_drop`.
    #[default]
    None,
    /// The item is copied into the target.
    Copy,
    /// The item is moved into the target.
    Move,
    /// A link to the item is created in the target.
    Link,
}

impl DropEffect {
    /// The HTML data-transfer keyword for this effect.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Copy => "copy",
            Self::Move => "move",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for DropEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

bitflags::bitflags! {
    /// Effects a source allows for the item it is dragging.
    ///
    /// Each named value of the HTML `effectAllowed` attribute is a subset of
    /// {copy, link, move}, so the eight values map onto the eight flag sets.
    /// [`EffectAllowed::NONE`] is the empty set.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct EffectAllowed: u8 {
        /// `copy`
        const COPY = 0b001;
        /// `link`
        const LINK = 0b010;
        /// `move`
        const MOVE = 0b100;
        /// `copyLink`
        const COPY_LINK = Self::COPY.bits() | Self::LINK.bits();
        /// `copyMove`
        const COPY_MOVE = Self::COPY.bits() | Self::MOVE.bits();
        /// `linkMove`
        const LINK_MOVE = Self::LINK.bits() | Self::MOVE.bits();
        /// `all`
        const ALL = Self::COPY.bits() | Self::LINK.bits() | Self::MOVE.bits();
    }
}

impl EffectAllowed {
    /// `none`: no effect is allowed.
    pub const NONE: Self = Self::empty();

    /// Whether `effect` may be chosen by a target for an item declaring `self`.
    ///
    /// [`DropEffect::None`] is always permitted.
    pub const fn permits(self, effect: DropEffect) -> bool {
        match effect {
            DropEffect::None => true,
            DropEffect::Copy => self.contains(Self::COPY),
            DropEffect::Move => self.contains(Self::MOVE),
            DropEffect::Link => self.contains(Self::LINK),
        }
    }

    /// The HTML data-transfer keyword for this set.
    pub fn keyword(self) -> &'static str {
        match (
            self.contains(Self::COPY),
            self.contains(Self::LINK),
            self.contains(Self::MOVE),
        ) {
            (false, false, false) => "none",
            (true, false, false) => "copy",
            (false, true, false) => "link",
            (false, false, true) => "move",
            (true, true, false) => "copyLink",
            (true, false, true) => "copyMove",
            (false, true, true) => "linkMove",
            (true, true, true) => "all",
        }
    }
}

impl Default for EffectAllowed {
    fn default() -> Self {
        Self::ALL
    }
}

impl fmt::Display for EffectAllowed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

bitflags::bitflags! {
    /// Modifier keys held while a target event fired.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct Modifiers: u8 {
        /// Control key.
        const CTRL  = 0b0001;
        /// Shift key.
        const SHIFT = 0b0010;
        /// Alt (option) key.
        const ALT   = 0b0100;
        /// Meta (command, windows) key.
        const META  = 0b1000;
    }
}

/// Pointer status relative to the element an event is delivered against.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MouseOverStatus {
    /// Pointer position in viewport coordinates.
    pub position: Point,
    /// Pointer position relative to the element's top-left corner.
    pub offset: Vec2,
    /// Size of the element's bounding box.
    pub size: Size,
}

/// Normalized status of a target event: pointer status plus modifier keys.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DragStatus {
    /// Pointer status relative to the current target.
    pub mouse: MouseOverStatus,
    /// Modifier keys held when the event fired.
    pub modifiers: Modifiers,
}

impl DragStatus {
    /// Pointer position in viewport coordinates.
    pub fn position(&self) -> Point {
        self.mouse.position
    }
}

/// Which sides of a hovered target the pointer is near.
///
/// All four sides are always present. See
/// [`EdgeThresholds`] for how proximity is configured.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct EdgeState {
    /// Pointer is within the top threshold.
    pub top: bool,
    /// Pointer is within the right threshold.
    pub right: bool,
    /// Pointer is within the bottom threshold.
    pub bottom: bool,
    /// Pointer is within the left threshold.
    pub left: bool,
}

impl EdgeState {
    /// No side is near.
    pub const NONE: Self = Self {
        top: false,
        right: false,
        bottom: false,
        left: false,
    };

    /// Whether the pointer is near any side.
    pub const fn any(self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

/// Per-side edge-proximity distances for a drop target.
///
/// A threshold of `0.0` means the pointer is never considered near that side.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EdgeThresholds {
    /// Distance from the top side.
    pub top: f64,
    /// Distance from the right side.
    pub right: f64,
    /// Distance from the bottom side.
    pub bottom: f64,
    /// Distance from the left side.
    pub left: f64,
}

impl EdgeThresholds {
    /// Same threshold on all four sides.
    pub const fn uniform(distance: f64) -> Self {
        Self {
            top: distance,
            right: distance,
            bottom: distance,
            left: distance,
        }
    }

    /// Compute edge proximity from a pointer offset inside a box of `size`.
    pub fn detect(&self, offset: Vec2, size: Size) -> EdgeState {
        EdgeState {
            top: offset.y < self.top,
            right: offset.x > size.width - self.right,
            bottom: offset.y > size.height - self.bottom,
            left: offset.x < self.left,
        }
    }
}

/// Identity and payload of the item being dragged.
///
/// Exists only while an operation is in progress and is shared read-only by
/// every target evaluated during it (see [`DragContext`](crate::context::DragContext)).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceData<T, D = ()> {
    /// Declared item type, matched against target [`AcceptedTypes`](crate::options::AcceptedTypes).
    pub kind: T,
    /// Payload collected from the source when the drag started.
    pub user_data: Option<D>,
}
