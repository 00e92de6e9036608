// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler configuration: drag source and drop target descriptors, accepted
//! types, prop names, and the events handed to user callbacks.
//!
//! Configuration is immutable once a [`Handler`](crate::handler::Handler) is
//! built from it. Descriptors are assembled with consuming builder methods:
//!
//! ```
//! use dragline::options::{AcceptedTypes, DragSource, DropTarget, HandlerOptions};
//! use dragline::types::{DropEffect, EdgeThresholds};
//!
//! let options: HandlerOptions<&str> = HandlerOptions::new()
//!     .drag_source(DragSource::new("CARD"))
//!     .drop_target(
//!         DropTarget::new(AcceptedTypes::map([("CARD", DropEffect::Move)]))
//!             .edges(EdgeThresholds::uniform(8.0)),
//!     );
//! assert!(options.drag_source.is_some());
//! ```

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use crate::types::{DropEffect, EdgeState, EdgeThresholds, EffectAllowed, Modifiers, SourceData};

/// Event passed to source callbacks.
#[derive(Debug)]
pub struct SourceEvent<'a, T, D = ()> {
    /// Pointer position in viewport coordinates.
    pub position: Point,
    /// The item being dragged.
    pub source: &'a SourceData<T, D>,
}

/// Event passed to `on_drag_enter` and `on_drag_leave` target callbacks.
#[derive(Debug)]
pub struct TargetEvent<'a, T, D = (), R = ()> {
    /// Pointer position in viewport coordinates.
    pub position: Point,
    /// The item being dragged.
    pub source: &'a SourceData<T, D>,
    /// Target reference supplied by the binding layer, if any.
    pub target: Option<&'a R>,
}

/// Event passed to `on_drag_over` and `on_drop` target callbacks.
#[derive(Debug)]
pub struct TargetTickEvent<'a, T, D = (), R = ()> {
    /// Pointer position in viewport coordinates.
    pub position: Point,
    /// The item being dragged.
    pub source: &'a SourceData<T, D>,
    /// Target reference supplied by the binding layer, if any.
    pub target: Option<&'a R>,
    /// Edge proximity for this tick; all false when no thresholds are configured.
    pub edges: EdgeState,
    /// Modifier keys held during this tick.
    pub modifiers: Modifiers,
}

/// Produces a payload from the source props when a drag starts.
pub type CollectFn<P, D> = Box<dyn Fn(Option<&P>) -> Option<D>>;

/// Source callback choosing the allowed effects on drag start.
pub type DragStartFn<T, D> = Box<dyn FnMut(&SourceEvent<'_, T, D>) -> Option<EffectAllowed>>;

/// Source callback for drag ticks and drag end.
pub type SourceFn<T, D> = Box<dyn FnMut(&SourceEvent<'_, T, D>)>;

/// Target callback on enter; may override the negotiated effect.
pub type DragEnterFn<T, D, R> = Box<dyn FnMut(&TargetEvent<'_, T, D, R>) -> Option<DropEffect>>;

/// Target callback on leave.
pub type DragLeaveFn<T, D, R> = Box<dyn FnMut(&TargetEvent<'_, T, D, R>)>;

/// Target callback on each hover tick; may override the effect for that tick.
pub type DragOverFn<T, D, R> = Box<dyn FnMut(&TargetTickEvent<'_, T, D, R>) -> Option<DropEffect>>;

/// Target callback on drop.
pub type DropFn<T, D, R> = Box<dyn FnMut(&TargetTickEvent<'_, T, D, R>)>;

/// Types a drop target accepts, decided once at configuration time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AcceptedTypes<T> {
    /// Each listed type is accepted with [`DropEffect::Copy`].
    List(Vec<T>),
    /// Each mapped type is accepted with its own effect.
    Map(BTreeMap<T, DropEffect>),
}

impl<T: Ord> AcceptedTypes<T> {
    /// Accept a single type with [`DropEffect::Copy`].
    pub fn single(kind: T) -> Self {
        Self::List(vec![kind])
    }

    /// Accept each type with [`DropEffect::Copy`].
    pub fn list(kinds: impl IntoIterator<Item = T>) -> Self {
        Self::List(kinds.into_iter().collect())
    }

    /// Accept each type with the paired effect.
    pub fn map(pairs: impl IntoIterator<Item = (T, DropEffect)>) -> Self {
        Self::Map(pairs.into_iter().collect())
    }

    /// Whether `kind` appears in the accepted set.
    pub fn accepts(&self, kind: &T) -> bool {
        match self {
            Self::List(kinds) => kinds.contains(kind),
            Self::Map(map) => map.contains_key(kind),
        }
    }

    /// The effect negotiated for an item of type `kind`.
    ///
    /// Returns [`DropEffect::None`] when `kind` is not accepted.
    pub fn negotiate(&self, kind: &T) -> DropEffect {
        if !self.accepts(kind) {
            return DropEffect::None;
        }
        match self {
            Self::List(_) => DropEffect::Copy,
            Self::Map(map) => map.get(kind).copied().unwrap_or_default(),
        }
    }
}

impl<T> Default for AcceptedTypes<T> {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// Drag source descriptor.
pub struct DragSource<T, D = (), P = ()> {
    /// Item type published while this source is dragged.
    pub kind: T,
    pub(crate) collect: Option<CollectFn<P, D>>,
    pub(crate) on_drag_start: Option<DragStartFn<T, D>>,
    pub(crate) on_drag: Option<SourceFn<T, D>>,
    pub(crate) on_drag_end: Option<SourceFn<T, D>>,
}

impl<T, D, P> DragSource<T, D, P> {
    /// A source of items of type `kind` with no callbacks.
    pub fn new(kind: T) -> Self {
        Self {
            kind,
            collect: None,
            on_drag_start: None,
            on_drag: None,
            on_drag_end: None,
        }
    }

    /// Produce the drag payload from the source props on drag start.
    pub fn collect(mut self, f: impl Fn(Option<&P>) -> Option<D> + 'static) -> Self {
        self.collect = Some(Box::new(f));
        self
    }

    /// Called on drag start; returning `Some` chooses the allowed effects.
    pub fn on_drag_start(
        mut self,
        f: impl FnMut(&SourceEvent<'_, T, D>) -> Option<EffectAllowed> + 'static,
    ) -> Self {
        self.on_drag_start = Some(Box::new(f));
        self
    }

    /// Called on every drag tick.
    pub fn on_drag(mut self, f: impl FnMut(&SourceEvent<'_, T, D>) + 'static) -> Self {
        self.on_drag = Some(Box::new(f));
        self
    }

    /// Called when the operation ends.
    pub fn on_drag_end(mut self, f: impl FnMut(&SourceEvent<'_, T, D>) + 'static) -> Self {
        self.on_drag_end = Some(Box::new(f));
        self
    }
}

impl<T: fmt::Debug, D, P> fmt::Debug for DragSource<T, D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSource")
            .field("kind", &self.kind)
            .field("collect", &self.collect.is_some())
            .finish_non_exhaustive()
    }
}

/// Drop target descriptor.
pub struct DropTarget<T, D = (), R = ()> {
    /// Accepted item types.
    pub types: AcceptedTypes<T>,
    /// Edge-proximity thresholds; `None` disables edge detection entirely.
    pub edges: Option<EdgeThresholds>,
    pub(crate) on_drag_enter: Option<DragEnterFn<T, D, R>>,
    pub(crate) on_drag_over: Option<DragOverFn<T, D, R>>,
    pub(crate) on_drag_leave: Option<DragLeaveFn<T, D, R>>,
    pub(crate) on_drop: Option<DropFn<T, D, R>>,
}

impl<T, D, R> DropTarget<T, D, R> {
    /// A target accepting `types` with no callbacks and no edge detection.
    pub fn new(types: AcceptedTypes<T>) -> Self {
        Self {
            types,
            edges: None,
            on_drag_enter: None,
            on_drag_over: None,
            on_drag_leave: None,
            on_drop: None,
        }
    }

    /// Enable edge detection with the given thresholds.
    pub fn edges(mut self, thresholds: EdgeThresholds) -> Self {
        self.edges = Some(thresholds);
        self
    }

    /// Called when the pointer enters; returning `Some` overrides the negotiated effect.
    pub fn on_drag_enter(
        mut self,
        f: impl FnMut(&TargetEvent<'_, T, D, R>) -> Option<DropEffect> + 'static,
    ) -> Self {
        self.on_drag_enter = Some(Box::new(f));
        self
    }

    /// Called on every hover tick; returning `Some` overrides the effect for that tick.
    pub fn on_drag_over(
        mut self,
        f: impl FnMut(&TargetTickEvent<'_, T, D, R>) -> Option<DropEffect> + 'static,
    ) -> Self {
        self.on_drag_over = Some(Box::new(f));
        self
    }

    /// Called when the pointer leaves or the hover is cleaned up.
    pub fn on_drag_leave(mut self, f: impl FnMut(&TargetEvent<'_, T, D, R>) + 'static) -> Self {
        self.on_drag_leave = Some(Box::new(f));
        self
    }

    /// Called when an item is dropped with an effect other than `none`.
    pub fn on_drop(mut self, f: impl FnMut(&TargetTickEvent<'_, T, D, R>) + 'static) -> Self {
        self.on_drop = Some(Box::new(f));
        self
    }
}

impl<T: fmt::Debug, D, R> fmt::Debug for DropTarget<T, D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropTarget")
            .field("types", &self.types)
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

/// Names under which derived state is exposed by
/// [`Handler::props`](crate::handler::Handler::props).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropMap {
    /// Name of the dragging flag. Default `isDragging`.
    pub is_dragging: Cow<'static, str>,
    /// Name of the over flag. Default `isOver`.
    pub is_over: Cow<'static, str>,
    /// Name of the edge state. Default `isOverEdge`.
    pub is_over_edge: Cow<'static, str>,
}

impl PropMap {
    /// Rename the dragging flag.
    pub fn is_dragging(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.is_dragging = name.into();
        self
    }

    /// Rename the over flag.
    pub fn is_over(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.is_over = name.into();
        self
    }

    /// Rename the edge state.
    pub fn is_over_edge(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.is_over_edge = name.into();
        self
    }
}

impl Default for PropMap {
    fn default() -> Self {
        Self {
            is_dragging: Cow::Borrowed("isDragging"),
            is_over: Cow::Borrowed("isOver"),
            is_over_edge: Cow::Borrowed("isOverEdge"),
        }
    }
}

/// Full handler configuration.
///
/// At least one of `drag_source` and `drop_target` must be set; see
/// [`Handler::new`](crate::handler::Handler::new).
pub struct HandlerOptions<T, D = (), P = (), R = ()> {
    /// Source role, if this element can be dragged.
    pub drag_source: Option<DragSource<T, D, P>>,
    /// Target role, if this element accepts drops.
    pub drop_target: Option<DropTarget<T, D, R>>,
    /// Names of the derived props.
    pub prop_map: PropMap,
}

impl<T, D, P, R> HandlerOptions<T, D, P, R> {
    /// Empty options. Add at least one role before building a handler.
    pub fn new() -> Self {
        Self {
            drag_source: None,
            drop_target: None,
            prop_map: PropMap::default(),
        }
    }

    /// Set the source role.
    pub fn drag_source(mut self, source: DragSource<T, D, P>) -> Self {
        self.drag_source = Some(source);
        self
    }

    /// Set the target role.
    pub fn drop_target(mut self, target: DropTarget<T, D, R>) -> Self {
        self.drop_target = Some(target);
        self
    }

    /// Set the prop names.
    pub fn prop_map(mut self, prop_map: PropMap) -> Self {
        self.prop_map = prop_map;
        self
    }
}

impl<T, D, P, R> Default for HandlerOptions<T, D, P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, D, P, R> fmt::Debug for HandlerOptions<T, D, P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("drag_source", &self.drag_source)
            .field("drop_target", &self.drop_target)
            .field("prop_map", &self.prop_map)
            .finish()
    }
}
