// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-element handler state machine.
//!
//! ## Overview
//!
//! A [`Handler`] is built once per connected element from immutable
//! [`HandlerOptions`]. It implements both halves of the
//! [protocol](crate::protocol), keeps three pieces of derived state, and calls
//! the user callbacks configured on its [`DragSource`] and [`DropTarget`].
//!
//! ## Derived state
//!
//! - `is_dragging`: true between this handler's drag start and drag end.
//! - `is_over`: true between enter and leave, and only while the negotiated
//!   effect is not [`DropEffect::None`].
//! - `is_over_edge`: recomputed on every over/drop tick from the pointer
//!   offset and the configured [`EdgeThresholds`](crate::types::EdgeThresholds);
//!   reset on leave.
//!
//! Observers are notified only when a value actually changes. The dragging
//! observer covers `is_dragging`; the over observer covers `is_over` and
//! `is_over_edge`.
//!
//! ## Example
//!
//! ```
//! use dragline::context::DragContext;
//! use dragline::handler::Handler;
//! use dragline::options::{AcceptedTypes, DragSource, DropTarget, HandlerOptions};
//! use dragline::protocol::{DragPoint, SourceHandler, TargetHandler};
//! use dragline::types::DropEffect;
//! use kurbo::Point;
//!
//! let ctx = DragContext::new();
//! let mut card: Handler<&str> = Handler::new(
//!     ctx.clone(),
//!     HandlerOptions::new().drag_source(DragSource::new("CARD")),
//! )
//! .unwrap();
//! let mut lane: Handler<&str> = Handler::new(
//!     ctx,
//!     HandlerOptions::new().drop_target(DropTarget::new(AcceptedTypes::list(["CARD"]))),
//! )
//! .unwrap();
//!
//! let at = DragPoint { node: 0_u32, position: Point::new(5.0, 5.0) };
//! card.on_drag_start(at);
//! lane.on_drag_enter(DragPoint { node: 1, ..at });
//! assert!(lane.is_over());
//! assert_eq!(lane.drop_effect(), DropEffect::Copy);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use kurbo::Point;
use log::trace;

use crate::context::DragContext;
use crate::error::HandlerError;
use crate::options::{
    DragSource, DropTarget, HandlerOptions, PropMap, SourceEvent, TargetEvent, TargetTickEvent,
};
use crate::props::{PropValue, Props};
use crate::protocol::{DragOverEvent, DragPoint, DropEvent, SourceHandler, TargetHandler};
use crate::types::{DropEffect, EdgeState, EffectAllowed, MouseOverStatus, SourceData};

/// Observer invoked when derived state changes.
///
/// Receives the fresh [`Props`] snapshot. The handler is usually still
/// borrowed by the driver at that point, so observers must not reach back
/// into it through another handle.
pub type StateCallback = Box<dyn FnMut(&Props)>;

/// A single-slot observer.
#[derive(Default)]
struct ObserverSlot {
    callback: Option<StateCallback>,
}

impl ObserverSlot {
    fn set(&mut self, callback: Option<StateCallback>) {
        self.callback = callback;
    }

    fn notify(&mut self, props: &Props) {
        if let Some(cb) = self.callback.as_mut() {
            cb(props);
        }
    }
}

/// Write `value` into `slot`, returning whether it changed.
fn update<V: PartialEq>(slot: &mut V, value: V) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Per-element drag/drop state machine.
///
/// - `T`: item type tag.
/// - `D`: payload produced by the source's `collect`.
/// - `P`: source props handed to `collect` (see [`Handler::set_source_props`]).
/// - `R`: target reference handed to target callbacks (see [`Handler::set_target`]).
pub struct Handler<T, D = (), P = (), R = ()> {
    source: Option<DragSource<T, D, P>>,
    target: Option<DropTarget<T, D, R>>,
    prop_map: PropMap,
    context: DragContext<T, D>,
    source_props: Option<P>,
    target_ref: Option<R>,
    dragging: bool,
    over: bool,
    over_edge: EdgeState,
    drop_effect: DropEffect,
    dragging_observer: ObserverSlot,
    over_observer: ObserverSlot,
}

impl<T: fmt::Debug, D: fmt::Debug, P, R> fmt::Debug for Handler<T, D, P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("dragging", &self.dragging)
            .field("over", &self.over)
            .field("over_edge", &self.over_edge)
            .field("drop_effect", &self.drop_effect)
            .finish_non_exhaustive()
    }
}

impl<T, D, P, R> Handler<T, D, P, R>
where
    T: Clone + Ord,
{
    /// Build a handler on the drag surface described by `context`.
    ///
    /// Fails with [`HandlerError::MissingRole`] if `options` configures neither
    /// a drag source nor a drop target.
    pub fn new(
        context: DragContext<T, D>,
        options: HandlerOptions<T, D, P, R>,
    ) -> Result<Self, HandlerError> {
        let HandlerOptions {
            drag_source,
            drop_target,
            prop_map,
        } = options;
        if drag_source.is_none() && drop_target.is_none() {
            return Err(HandlerError::MissingRole);
        }
        Ok(Self {
            source: drag_source,
            target: drop_target,
            prop_map,
            context,
            source_props: None,
            target_ref: None,
            dragging: false,
            over: false,
            over_edge: EdgeState::NONE,
            drop_effect: DropEffect::None,
            dragging_observer: ObserverSlot::default(),
            over_observer: ObserverSlot::default(),
        })
    }

    /// Whether a drag source is configured.
    pub fn does_handle_source(&self) -> bool {
        self.source.is_some()
    }

    /// Whether a drop target is configured.
    pub fn does_handle_target(&self) -> bool {
        self.target.is_some()
    }

    /// Whether this handler's source is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether an acceptable item is hovering this target.
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Edge proximity from the latest over/drop tick.
    pub fn is_over_edge(&self) -> EdgeState {
        self.over_edge
    }

    /// Effect negotiated on the latest enter.
    pub fn drop_effect(&self) -> DropEffect {
        self.drop_effect
    }

    /// The drag surface this handler belongs to.
    pub fn context(&self) -> &DragContext<T, D> {
        &self.context
    }

    /// Derived-state snapshot, keyed by the configured [`PropMap`].
    ///
    /// - `isDragging` is present only with a drag source.
    /// - `isOver` is present only with a drop target.
    /// - `isOverEdge` is present only with a drop target that has edge
    ///   thresholds, and only while `isOver` is true.
    pub fn props(&self) -> Props {
        let mut props = Props::default();
        if self.source.is_some() {
            props.push(
                self.prop_map.is_dragging.clone(),
                PropValue::Bool(self.dragging),
            );
        }
        if let Some(target) = &self.target {
            props.push(self.prop_map.is_over.clone(), PropValue::Bool(self.over));
            if self.over && target.edges.is_some() {
                props.push(
                    self.prop_map.is_over_edge.clone(),
                    PropValue::Edges(self.over_edge),
                );
            }
        }
        props
    }

    /// Set or clear the observer for dragging-state changes.
    pub fn set_dragging_state_callback(&mut self, callback: Option<StateCallback>) {
        self.dragging_observer.set(callback);
    }

    /// Set or clear the observer for over-state changes.
    pub fn set_over_state_callback(&mut self, callback: Option<StateCallback>) {
        self.over_observer.set(callback);
    }

    /// Set or clear the props handed to the source's `collect`.
    pub fn set_source_props(&mut self, props: Option<P>) {
        self.source_props = props;
    }

    /// Set or clear the reference handed to target callbacks.
    pub fn set_target(&mut self, target: Option<R>) {
        self.target_ref = target;
    }

    pub(crate) fn set_dragging(&mut self, value: bool) {
        if update(&mut self.dragging, value) {
            let props = self.props();
            self.dragging_observer.notify(&props);
        }
    }

    pub(crate) fn set_over(&mut self, value: bool) {
        if update(&mut self.over, value) {
            let props = self.props();
            self.over_observer.notify(&props);
        }
    }

    pub(crate) fn set_over_edge(&mut self, value: EdgeState) {
        if update(&mut self.over_edge, value) {
            let props = self.props();
            self.over_observer.notify(&props);
        }
    }

    /// Recompute edge state for a tick. A no-op without configured thresholds.
    fn detect_edges(&mut self, mouse: &MouseOverStatus) {
        let Some(thresholds) = self.target.as_ref().and_then(|t| t.edges) else {
            return;
        };
        self.set_over_edge(thresholds.detect(mouse.offset, mouse.size));
    }

    fn source_event(&mut self, position: Point, end: bool) {
        let Some(data) = self.context.current() else {
            return;
        };
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let cb = if end {
            source.on_drag_end.as_mut()
        } else {
            source.on_drag.as_mut()
        };
        if let Some(cb) = cb {
            cb(&SourceEvent {
                position,
                source: &data,
            });
        }
    }
}

impl<K, T, D, P, R> SourceHandler<K> for Handler<T, D, P, R>
where
    T: Clone + Ord,
{
    fn handles_source(&self) -> bool {
        self.does_handle_source()
    }

    fn on_drag_start(&mut self, event: DragPoint<K>) -> Option<EffectAllowed> {
        if self.source.is_none() {
            return None;
        }
        self.set_dragging(true);
        let source = self.source.as_mut()?;
        let user_data = source
            .collect
            .as_ref()
            .and_then(|collect| collect(self.source_props.as_ref()));
        let data = Rc::new(SourceData {
            kind: source.kind.clone(),
            user_data,
        });
        self.context.begin(Rc::clone(&data));
        let chosen = source.on_drag_start.as_mut().and_then(|cb| {
            cb(&SourceEvent {
                position: event.position,
                source: &data,
            })
        });
        let allowed = chosen.unwrap_or(EffectAllowed::ALL);
        self.context.allow(allowed);
        Some(allowed)
    }

    fn on_drag(&mut self, event: DragPoint<K>) {
        self.source_event(event.position, false);
    }

    fn on_drag_end(&mut self, event: DragPoint<K>) {
        self.source_event(event.position, true);
        self.set_dragging(false);
        if self.source.is_some() {
            self.context.end();
        }
    }
}

impl<K, T, D, P, R> TargetHandler<K> for Handler<T, D, P, R>
where
    T: Clone + Ord,
{
    fn handles_target(&self) -> bool {
        self.does_handle_target()
    }

    fn on_drag_enter(&mut self, event: DragPoint<K>) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        let effect = match self.context.current() {
            Some(data) => {
                let negotiated = target.types.negotiate(&data.kind);
                let chosen = target.on_drag_enter.as_mut().and_then(|cb| {
                    cb(&TargetEvent {
                        position: event.position,
                        source: &data,
                        target: self.target_ref.as_ref(),
                    })
                });
                let effect = chosen.unwrap_or(negotiated);
                if self.context.effect_allowed().permits(effect) {
                    effect
                } else {
                    DropEffect::None
                }
            }
            None => DropEffect::None,
        };
        trace!("drag enter negotiated {effect:?}");
        self.drop_effect = effect;
        if effect != DropEffect::None {
            self.set_over(true);
        }
    }

    fn on_drag_over(&mut self, event: DragOverEvent<K>) -> DropEffect {
        if self.target.is_none() {
            return DropEffect::None;
        }
        self.detect_edges(&event.status.mouse);
        let mut effect = self.drop_effect;
        if let Some(data) = self.context.current() {
            let edges = self.over_edge;
            let target_ref = self.target_ref.as_ref();
            if let Some(cb) = self.target.as_mut().and_then(|t| t.on_drag_over.as_mut())
                && let Some(chosen) = cb(&TargetTickEvent {
                    position: event.status.position(),
                    source: &data,
                    target: target_ref,
                    edges,
                    modifiers: event.status.modifiers,
                })
            {
                effect = chosen;
            }
        }
        if !event.effect_allowed.permits(effect) {
            effect = DropEffect::None;
        }
        // A tick override never raises `is_over`, but a refused drop clears it.
        self.set_over(self.drop_effect != DropEffect::None && effect != DropEffect::None);
        effect
    }

    fn on_drag_leave(&mut self, event: DragPoint<K>) {
        if let Some(data) = self.context.current() {
            let target_ref = self.target_ref.as_ref();
            if let Some(cb) = self.target.as_mut().and_then(|t| t.on_drag_leave.as_mut()) {
                cb(&TargetEvent {
                    position: event.position,
                    source: &data,
                    target: target_ref,
                });
            }
        }
        self.drop_effect = DropEffect::None;
        self.set_over_edge(EdgeState::NONE);
        self.set_over(false);
    }

    fn on_drop(&mut self, event: DropEvent<K>) {
        if self.target.is_none() {
            return;
        }
        self.detect_edges(&event.status.mouse);
        let Some(data) = self.context.current() else {
            return;
        };
        let edges = self.over_edge;
        let target_ref = self.target_ref.as_ref();
        if let Some(cb) = self.target.as_mut().and_then(|t| t.on_drop.as_mut()) {
            cb(&TargetTickEvent {
                position: event.status.position(),
                source: &data,
                target: target_ref,
                edges,
                modifiers: event.status.modifiers,
            });
        }
    }
}
