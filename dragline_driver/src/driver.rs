// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The driver state machine.
//!
//! ## Overview
//!
//! [`Driver`] owns at most one drag operation at a time. Feed it every native
//! drag event via [`Driver::handle`]; it resolves the connected element the
//! event belongs to, updates the operation, and emits protocol calls to the
//! connected handlers.
//!
//! ## States
//!
//! `Idle` → `Dragging` on drag start, back to `Idle` on drag end or when the
//! dragged source is disconnected. While dragging, the driver tracks the
//! target the pointer is over, if any.
//!
//! ## Recovered host quirks
//!
//! - Drag ticks at exactly (0, 0): the driver switches to fallback tracking and
//!   replays drag-over events that reach the document (no connected target)
//!   as drag ticks of the dragged source. The first genuine position switches
//!   back, and fallback is never entered again until [`Driver::disconnect_all`].
//! - Missing drag-over events (hovered target removed or left): two drag ticks
//!   without a drag-over in between synthesize a leave for the tracked target.
//! - Unreliable drag-end coordinates: the last known position is used instead.
//! - Payload writes refused by the host: retried under a plain format.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use dragline::context::DragContext;
//! use dragline::handler::Handler;
//! use dragline::options::{AcceptedTypes, DragSource, DropTarget, HandlerOptions};
//! use dragline_driver::driver::Driver;
//! use dragline_driver::memory::MemoryHost;
//! use dragline_driver::types::{NativeEvent, NativeEventKind::*};
//! use kurbo::{Point, Rect};
//!
//! let mut host = MemoryHost::new();
//! let card = host.insert(None, Rect::new(0.0, 0.0, 50.0, 50.0));
//! let lane = host.insert(None, Rect::new(100.0, 0.0, 200.0, 100.0));
//!
//! let ctx = DragContext::new();
//! let source_options = HandlerOptions::new().drag_source(DragSource::new("CARD"));
//! let source: Rc<RefCell<Handler<&str>>> =
//!     Rc::new(RefCell::new(Handler::new(ctx.clone(), source_options).unwrap()));
//! let target_options =
//!     HandlerOptions::new().drop_target(DropTarget::new(AcceptedTypes::single("CARD")));
//! let target: Rc<RefCell<Handler<&str>>> =
//!     Rc::new(RefCell::new(Handler::new(ctx, target_options).unwrap()));
//!
//! let mut driver = Driver::new(host);
//! driver.connect_source(card, source.clone()).unwrap();
//! driver.connect_target(lane, target.clone()).unwrap();
//!
//! driver.handle(NativeEvent::new(DragStart, Some(card), Point::new(10.0, 10.0))).unwrap();
//! driver.handle(NativeEvent::new(DragOver, Some(lane), Point::new(150.0, 50.0))).unwrap();
//! assert!(target.borrow().is_over());
//! driver.handle(NativeEvent::new(Drop, Some(lane), Point::new(150.0, 50.0))).unwrap();
//! driver.handle(NativeEvent::new(DragEnd, Some(card), Point::new(150.0, 50.0))).unwrap();
//! assert!(!source.borrow().is_dragging());
//! assert!(!target.borrow().is_over());
//! ```

use core::fmt;

use dragline::protocol::{
    DragOverEvent, DragPoint, DropEvent, HandlerRef, SourceHandler, TargetHandler,
};
use dragline::types::{DragStatus, DropEffect, EffectAllowed};
use kurbo::Point;
use log::{debug, trace, warn};

use crate::error::DragError;
use crate::normalize::{is_origin, to_point, to_status};
use crate::registry::Registry;
use crate::route::resolve;
use crate::types::{Cursor, Host, NativeEvent, NativeEventKind, Outcome, Role};

/// Payload format written on drag start.
pub const PAYLOAD_FORMAT: &str = "application/x-dragline";

/// Format retried when the host refuses [`PAYLOAD_FORMAT`].
pub const FALLBACK_PAYLOAD_FORMAT: &str = "text";

/// The single drag operation in progress.
#[derive(Copy, Clone, Debug)]
struct Operation<K> {
    dragged: K,
    last_position: Point,
    effect_allowed: EffectAllowed,
    last_effect: DropEffect,
    /// Target the last drag-over was delivered to.
    over: Option<K>,
    /// Set by a drag tick while over a target, cleared by the next drag-over.
    expect_over: Option<K>,
}

impl<K> Operation<K> {
    fn new(dragged: K, position: Point, effect_allowed: EffectAllowed) -> Self {
        Self {
            dragged,
            last_position: position,
            effect_allowed,
            last_effect: DropEffect::None,
            over: None,
            expect_over: None,
        }
    }

    fn clear_over(&mut self) {
        self.over = None;
        self.expect_over = None;
        self.last_effect = DropEffect::None;
    }
}

/// Fallback tracking state. Outlives operations.
#[derive(Copy, Clone, Debug)]
struct Fallback {
    active: bool,
    /// Closed for good once fallback has been switched off.
    latch_open: bool,
    /// Document drag-overs are replayed only after a drag tick in fallback mode.
    replay_armed: bool,
}

impl Default for Fallback {
    fn default() -> Self {
        Self {
            active: false,
            latch_open: true,
            replay_armed: false,
        }
    }
}

/// Normalizes a host's native drag events into protocol calls.
///
/// `K` is the element identity, `H` the [`Host`] the driver reads the tree
/// from and writes affordances to.
pub struct Driver<K, H> {
    host: H,
    registry: Registry<K>,
    operation: Option<Operation<K>>,
    fallback: Fallback,
}

impl<K: fmt::Debug, H: fmt::Debug> fmt::Debug for Driver<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("host", &self.host)
            .field("registry", &self.registry)
            .field("operation", &self.operation)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl<K, H> Driver<K, H>
where
    K: Copy + Ord + fmt::Debug,
    H: Host<K>,
{
    /// An idle driver with nothing connected.
    pub fn new(host: H) -> Self {
        Self {
            host,
            registry: Registry::new(),
            operation: None,
            fallback: Fallback::default(),
        }
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably; use it to update the element tree between events.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consume the driver, returning the host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Current connections.
    pub fn registry(&self) -> &Registry<K> {
        &self.registry
    }

    /// Whether an operation is in progress.
    pub fn is_dragging(&self) -> bool {
        self.operation.is_some()
    }

    /// Source of the operation in progress.
    pub fn dragged(&self) -> Option<K> {
        self.operation.map(|op| op.dragged)
    }

    /// Target the pointer is tracked over.
    pub fn over(&self) -> Option<K> {
        self.operation.and_then(|op| op.over)
    }

    /// Effects allowed by the source of the operation in progress.
    pub fn effect_allowed(&self) -> Option<EffectAllowed> {
        self.operation.map(|op| op.effect_allowed)
    }

    /// Effect returned by the latest drag-over.
    pub fn last_effect(&self) -> DropEffect {
        self.operation.map_or(DropEffect::None, |op| op.last_effect)
    }

    /// Whether fallback tracking is active.
    pub fn fallback_active(&self) -> bool {
        self.fallback.active
    }

    /// Connect `handler` to `node` as a drag source and mark `node` draggable.
    pub fn connect_source(&mut self, node: K, handler: HandlerRef<K>) -> Result<(), DragError<K>> {
        if !handler.borrow().handles_source() {
            warn!("connecting {node:?} as a source with a handler that has no drag source");
        }
        self.connect(Role::Source, node, handler)
    }

    /// Connect `handler` to `node` as a drop target.
    pub fn connect_target(&mut self, node: K, handler: HandlerRef<K>) -> Result<(), DragError<K>> {
        if !handler.borrow().handles_target() {
            warn!("connecting {node:?} as a target with a handler that has no drop target");
        }
        self.connect(Role::Target, node, handler)
    }

    fn connect(&mut self, role: Role, node: K, handler: HandlerRef<K>) -> Result<(), DragError<K>> {
        let connection = self.registry.register(role, node, handler)?;
        connection.setup(&node, &mut self.host);
        debug!("connected {node:?} as {role}");
        Ok(())
    }

    /// Disconnect the source connection of `node`.
    ///
    /// If `node` is being dragged, its operation is finished first: a leave
    /// for the tracked target (if any), then a drag end at the last known
    /// position. Disconnecting an unknown element is a no-op.
    pub fn disconnect_source(&mut self, node: K) {
        if let Some(op) = self.operation
            && op.dragged == node
        {
            debug!("source {node:?} disconnected mid-drag");
            self.finish(op.last_position);
        }
        if let Some(connection) = self.registry.unregister(Role::Source, &node) {
            connection.teardown(&node, &mut self.host);
            debug!("disconnected source {node:?}");
        }
    }

    /// Disconnect the target connection of `node`.
    ///
    /// If the pointer is tracked over `node`, its leave is synthesized first.
    pub fn disconnect_target(&mut self, node: K) {
        if let Some(op) = self.operation.as_mut()
            && op.over == Some(node)
        {
            let position = op.last_position;
            op.clear_over();
            debug!("target {node:?} disconnected while hovered");
            self.emit_leave(node, position);
        }
        if let Some(connection) = self.registry.unregister(Role::Target, &node) {
            connection.teardown(&node, &mut self.host);
            debug!("disconnected target {node:?}");
        }
    }

    /// Finish any operation, disconnect everything and return to the initial state.
    pub fn disconnect_all(&mut self) {
        if let Some(op) = self.operation {
            self.finish(op.last_position);
        }
        for (node, connection) in self.registry.drain() {
            connection.teardown(&node, &mut self.host);
        }
        self.fallback = Fallback::default();
        debug!("driver reset");
    }

    /// Handle one native event.
    ///
    /// Errors are reported, never fatal: the event is rejected and driver
    /// state is left as it was.
    pub fn handle(&mut self, event: NativeEvent<K>) -> Result<Outcome, DragError<K>> {
        let result = match event.kind {
            NativeEventKind::DragStart => self.drag_start(&event),
            NativeEventKind::Drag => self.drag(&event),
            NativeEventKind::DragEnd => self.drag_end(&event),
            NativeEventKind::DragOver => self.drag_over(&event),
            NativeEventKind::Drop => self.handle_drop(&event),
        };
        if let Err(err) = &result {
            warn!("{} on {:?} rejected: {err}", event.kind, event.target);
        }
        result
    }

    fn resolve(&self, target: K, role: Role) -> Option<K> {
        resolve(target, &self.host, |n| self.registry.contains(role, n))
    }

    fn drag_start(&mut self, event: &NativeEvent<K>) -> Result<Outcome, DragError<K>> {
        let Some(target) = event.target else {
            return Ok(Outcome::StopAndConsume);
        };
        let Some(node) = self.resolve(target, Role::Source) else {
            return Ok(Outcome::Continue);
        };
        if let Some(op) = &self.operation {
            return Err(DragError::OperationAlreadyInProgress {
                dragged: op.dragged,
            });
        }
        let Some(handler) = self.registry.source(&node) else {
            return Ok(Outcome::Continue);
        };
        self.host.begin_transfer();
        self.write_payload();
        let position = to_point(event);
        let effect_allowed = handler
            .borrow_mut()
            .on_drag_start(DragPoint { node, position })
            .unwrap_or(EffectAllowed::ALL);
        self.host.set_effect_allowed(effect_allowed);
        self.host.set_cursor(&node, Cursor::Grabbing);
        self.operation = Some(Operation::new(node, position, effect_allowed));
        debug!("drag started on {node:?}, allowing {effect_allowed}");
        Ok(Outcome::Stop)
    }

    fn write_payload(&mut self) {
        if self.host.set_drag_data(PAYLOAD_FORMAT, "").is_ok() {
            return;
        }
        if let Err(err) = self.host.set_drag_data(FALLBACK_PAYLOAD_FORMAT, "") {
            warn!("drag payload not attached: {err}");
        }
    }

    fn drag(&mut self, event: &NativeEvent<K>) -> Result<Outcome, DragError<K>> {
        let Some(target) = event.target else {
            return Ok(Outcome::StopAndConsume);
        };
        if self.resolve(target, Role::Source).is_none() {
            return Ok(Outcome::Continue);
        }
        if self.operation.is_none() {
            return Err(DragError::NoOperationInProgress);
        }
        let position = to_point(event);
        if self.fallback.active {
            self.fallback.replay_armed = true;
            if !is_origin(position) {
                self.fallback = Fallback {
                    active: false,
                    latch_open: false,
                    replay_armed: false,
                };
                debug!("fallback tracking disabled for good");
            }
        } else if is_origin(position) {
            if self.fallback.latch_open {
                self.fallback.active = true;
                debug!("drag tick at origin, fallback tracking enabled");
            }
        } else {
            self.notify_drag(position);
        }
        Ok(Outcome::Stop)
    }

    /// Deliver a drag tick to the dragged source, synthesizing a leave when
    /// the drag-over expected since the previous tick never arrived.
    fn notify_drag(&mut self, position: Point) {
        let Some(op) = self.operation.as_mut() else {
            return;
        };
        op.last_position = position;
        let mut missed = None;
        if let Some(over) = op.over {
            if op.expect_over.is_some() {
                missed = Some(over);
                op.clear_over();
            } else {
                op.expect_over = Some(over);
            }
        }
        let dragged = op.dragged;
        if let Some(node) = missed {
            debug!("missing drag-over for {node:?}, synthesizing leave");
            self.emit_leave(node, position);
        }
        if let Some(handler) = self.registry.source(&dragged) {
            trace!("drag {dragged:?} at {position:?}");
            handler.borrow_mut().on_drag(DragPoint {
                node: dragged,
                position,
            });
        }
    }

    fn drag_end(&mut self, event: &NativeEvent<K>) -> Result<Outcome, DragError<K>> {
        let Some(target) = event.target else {
            return Ok(Outcome::StopAndConsume);
        };
        if self.resolve(target, Role::Source).is_none() {
            return Ok(Outcome::Continue);
        }
        let Some(op) = self.operation else {
            return Err(DragError::NoOperationInProgress);
        };
        let position = to_point(event);
        let position = if self.fallback.active || is_origin(position) {
            op.last_position
        } else {
            position
        };
        self.finish(position);
        Ok(Outcome::Stop)
    }

    /// End the operation: leave the tracked target, then end the drag.
    fn finish(&mut self, position: Point) {
        let Some(op) = self.operation.take() else {
            return;
        };
        if let Some(over) = op.over {
            debug!("operation ending over {over:?}, synthesizing leave");
            self.emit_leave(over, position);
        }
        if let Some(handler) = self.registry.source(&op.dragged) {
            handler.borrow_mut().on_drag_end(DragPoint {
                node: op.dragged,
                position,
            });
        }
        self.host.set_cursor(&op.dragged, Cursor::Grab);
        self.fallback.replay_armed = false;
        debug!("drag on {:?} ended", op.dragged);
    }

    fn drag_over(&mut self, event: &NativeEvent<K>) -> Result<Outcome, DragError<K>> {
        let Some(node) = event.target.and_then(|t| self.resolve(t, Role::Target)) else {
            return Ok(self.document_drag_over(event));
        };
        if self.operation.is_none() {
            return Ok(Outcome::Consume);
        }
        let status = to_status(event, node, &self.host)?;
        self.track_over(node, status);
        Ok(Outcome::StopAndConsume)
    }

    /// A drag-over no connected target handled.
    fn document_drag_over(&mut self, event: &NativeEvent<K>) -> Outcome {
        if self.fallback.active && self.fallback.replay_armed {
            trace!("replaying document drag-over as drag tick");
            self.notify_drag(to_point(event));
        }
        Outcome::Continue
    }

    /// Leave the old target and enter `node` if it changed, then deliver one
    /// drag-over to `node`.
    fn track_over(&mut self, node: K, status: DragStatus) {
        let Some(op) = self.operation else {
            return;
        };
        let position = status.position();
        let Some(handler) = self.registry.target(&node) else {
            return;
        };
        if op.over != Some(node) {
            if let Some(old) = op.over {
                self.emit_leave(old, position);
            }
            trace!("enter {node:?}");
            handler
                .borrow_mut()
                .on_drag_enter(DragPoint { node, position });
        }
        let effect = handler.borrow_mut().on_drag_over(DragOverEvent {
            node,
            status,
            effect_allowed: op.effect_allowed,
        });
        trace!("over {node:?}: {effect}");
        if let Some(op) = self.operation.as_mut() {
            op.last_effect = effect;
            op.over = Some(node);
            op.expect_over = None;
        }
    }

    fn handle_drop(&mut self, event: &NativeEvent<K>) -> Result<Outcome, DragError<K>> {
        let Some(node) = event.target.and_then(|t| self.resolve(t, Role::Target)) else {
            return Ok(Outcome::Continue);
        };
        let Some(op) = self.operation else {
            return Ok(Outcome::Consume);
        };
        let status = to_status(event, node, &self.host)?;
        if op.over != Some(node) {
            self.track_over(node, status);
        }
        let effect = self.last_effect();
        if let Some(handler) = self.registry.target(&node) {
            if effect != DropEffect::None {
                debug!("drop on {node:?} with {effect}");
                handler.borrow_mut().on_drop(DropEvent { node, status });
            } else {
                debug!("drop on {node:?} refused");
            }
            handler.borrow_mut().on_drag_leave(DragPoint {
                node,
                position: status.position(),
            });
        }
        if let Some(op) = self.operation.as_mut() {
            op.clear_over();
        }
        Ok(Outcome::StopAndConsume)
    }

    fn emit_leave(&self, node: K, position: Point) {
        if let Some(handler) = self.registry.target(&node) {
            trace!("leave {node:?}");
            handler
                .borrow_mut()
                .on_drag_leave(DragPoint { node, position });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryHost, NodeId};
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use kurbo::Rect;

    #[derive(Copy, Clone, Debug, PartialEq)]
    enum Call {
        Start(NodeId),
        Drag(NodeId, Point),
        End(NodeId, Point),
        Enter(NodeId),
        Over(NodeId),
        Leave(NodeId),
        Drop(NodeId),
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    struct Recorder {
        log: Log,
        allowed: Option<EffectAllowed>,
        effect: DropEffect,
    }

    impl SourceHandler<NodeId> for Recorder {
        fn on_drag_start(&mut self, event: DragPoint<NodeId>) -> Option<EffectAllowed> {
            self.log.borrow_mut().push(Call::Start(event.node));
            self.allowed
        }
        fn on_drag(&mut self, event: DragPoint<NodeId>) {
            self.log
                .borrow_mut()
                .push(Call::Drag(event.node, event.position));
        }
        fn on_drag_end(&mut self, event: DragPoint<NodeId>) {
            self.log
                .borrow_mut()
                .push(Call::End(event.node, event.position));
        }
    }

    impl TargetHandler<NodeId> for Recorder {
        fn on_drag_enter(&mut self, event: DragPoint<NodeId>) {
            self.log.borrow_mut().push(Call::Enter(event.node));
        }
        fn on_drag_over(&mut self, event: DragOverEvent<NodeId>) -> DropEffect {
            self.log.borrow_mut().push(Call::Over(event.node));
            self.effect
        }
        fn on_drag_leave(&mut self, event: DragPoint<NodeId>) {
            self.log.borrow_mut().push(Call::Leave(event.node));
        }
        fn on_drop(&mut self, event: DropEvent<NodeId>) {
            self.log.borrow_mut().push(Call::Drop(event.node));
        }
    }

    struct Fixture {
        driver: Driver<NodeId, MemoryHost>,
        log: Log,
        root: NodeId,
        source: NodeId,
        inner: NodeId,
        grip: NodeId,
        a: NodeId,
        a_label: NodeId,
        b: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_host(MemoryHost::new(), None)
        }

        fn with_host(mut host: MemoryHost, allowed: Option<EffectAllowed>) -> Self {
            let root = host.insert(None, Rect::new(0.0, 0.0, 400.0, 400.0));
            let source = host.insert(Some(root), Rect::new(10.0, 10.0, 90.0, 90.0));
            let inner = host.insert(Some(source), Rect::new(20.0, 20.0, 60.0, 60.0));
            let grip = host.insert(Some(inner), Rect::new(25.0, 25.0, 35.0, 35.0));
            let a = host.insert(Some(root), Rect::new(100.0, 0.0, 200.0, 100.0));
            let a_label = host.insert(Some(a), Rect::new(110.0, 10.0, 150.0, 30.0));
            let b = host.insert(Some(root), Rect::new(100.0, 200.0, 200.0, 300.0));

            let log = Log::default();
            let recorder = |effect| -> HandlerRef<NodeId> {
                Rc::new(RefCell::new(Recorder {
                    log: Rc::clone(&log),
                    allowed,
                    effect,
                }))
            };
            let mut driver = Driver::new(host);
            driver.connect_source(source, recorder(DropEffect::None)).unwrap();
            driver.connect_source(inner, recorder(DropEffect::None)).unwrap();
            driver.connect_target(a, recorder(DropEffect::Copy)).unwrap();
            driver.connect_target(b, recorder(DropEffect::None)).unwrap();
            Self {
                driver,
                log,
                root,
                source,
                inner,
                grip,
                a,
                a_label,
                b,
            }
        }

        fn send(
            &mut self,
            kind: NativeEventKind,
            target: Option<NodeId>,
            x: f64,
            y: f64,
        ) -> Result<Outcome, DragError<NodeId>> {
            self.driver
                .handle(NativeEvent::new(kind, target, Point::new(x, y)))
        }

        fn start(&mut self) {
            let source = self.source;
            assert_eq!(
                self.send(NativeEventKind::DragStart, Some(source), 10.0, 10.0),
                Ok(Outcome::Stop)
            );
        }

        fn drag(&mut self, x: f64, y: f64) {
            let source = self.source;
            assert_eq!(
                self.send(NativeEventKind::Drag, Some(source), x, y),
                Ok(Outcome::Stop)
            );
        }

        fn over(&mut self, target: NodeId) {
            let center = self.driver.host().bounds_of(&target).unwrap().center();
            assert_eq!(
                self.send(NativeEventKind::DragOver, Some(target), center.x, center.y),
                Ok(Outcome::StopAndConsume)
            );
        }

        fn document_over(&mut self, x: f64, y: f64) {
            let root = self.root;
            assert_eq!(
                self.send(NativeEventKind::DragOver, Some(root), x, y),
                Ok(Outcome::Continue)
            );
        }

        fn drop_on(&mut self, target: NodeId) {
            let center = self.driver.host().bounds_of(&target).unwrap().center();
            assert_eq!(
                self.send(NativeEventKind::Drop, Some(target), center.x, center.y),
                Ok(Outcome::StopAndConsume)
            );
        }

        fn end(&mut self, x: f64, y: f64) {
            let source = self.source;
            assert_eq!(
                self.send(NativeEventKind::DragEnd, Some(source), x, y),
                Ok(Outcome::Stop)
            );
        }

        fn take(&self) -> Vec<Call> {
            core::mem::take(&mut *self.log.borrow_mut())
        }
    }

    #[test]
    fn full_gesture_emits_canonical_sequence() {
        let mut f = Fixture::new();
        f.start();
        assert_eq!(f.driver.host().cursor(f.source), Some(Cursor::Grabbing));
        assert_eq!(f.driver.host().effect_allowed(), Some(EffectAllowed::ALL));
        f.over(f.a);
        assert_eq!(f.driver.over(), Some(f.a));
        assert_eq!(f.driver.last_effect(), DropEffect::Copy);
        f.drop_on(f.a);
        assert_eq!(f.driver.over(), None);
        f.end(150.0, 50.0);

        assert_eq!(
            f.take(),
            vec![
                Call::Start(f.source),
                Call::Enter(f.a),
                Call::Over(f.a),
                Call::Drop(f.a),
                Call::Leave(f.a),
                Call::End(f.source, Point::new(150.0, 50.0)),
            ]
        );
        assert!(!f.driver.is_dragging());
        assert_eq!(f.driver.host().cursor(f.source), Some(Cursor::Grab));
        assert_eq!(
            f.driver.host().drag_data(),
            &[(String::from(PAYLOAD_FORMAT), String::new())]
        );
    }

    #[test]
    fn alternating_targets_leave_before_enter() {
        let mut f = Fixture::new();
        f.start();
        f.take();
        f.over(f.a);
        f.over(f.b);
        f.drop_on(f.b);
        assert_eq!(
            f.take(),
            vec![
                Call::Enter(f.a),
                Call::Over(f.a),
                Call::Leave(f.a),
                Call::Enter(f.b),
                Call::Over(f.b),
                Call::Leave(f.b),
            ]
        );
    }

    #[test]
    fn repeated_over_enters_once() {
        let mut f = Fixture::new();
        f.start();
        f.take();
        f.over(f.a);
        f.over(f.a);
        f.over(f.a);
        f.end(150.0, 50.0);
        let calls = f.take();
        let count = |c: Call| calls.iter().filter(|x| **x == c).count();
        assert_eq!(count(Call::Enter(f.a)), 1);
        assert_eq!(count(Call::Over(f.a)), 3);
        assert_eq!(count(Call::Leave(f.a)), 1);
        assert_eq!(calls.last(), Some(&Call::End(f.source, Point::new(150.0, 50.0))));
    }

    #[test]
    fn second_start_is_rejected_without_side_effects() {
        let mut f = Fixture::new();
        f.start();
        f.over(f.a);
        let inner = f.inner;
        assert_eq!(
            f.send(NativeEventKind::DragStart, Some(inner), 30.0, 30.0),
            Err(DragError::OperationAlreadyInProgress { dragged: f.source })
        );
        assert_eq!(f.driver.dragged(), Some(f.source));
        assert_eq!(f.driver.over(), Some(f.a));
        assert_eq!(
            f.take(),
            vec![Call::Start(f.source), Call::Enter(f.a), Call::Over(f.a)]
        );
    }

    #[test]
    fn events_without_operation() {
        let mut f = Fixture::new();
        let (source, a) = (f.source, f.a);
        assert_eq!(
            f.send(NativeEventKind::Drag, Some(source), 5.0, 5.0),
            Err(DragError::NoOperationInProgress)
        );
        assert_eq!(
            f.send(NativeEventKind::DragEnd, Some(source), 5.0, 5.0),
            Err(DragError::NoOperationInProgress)
        );
        assert_eq!(
            f.send(NativeEventKind::DragOver, Some(a), 150.0, 50.0),
            Ok(Outcome::Consume)
        );
        assert_eq!(
            f.send(NativeEventKind::Drop, Some(a), 150.0, 50.0),
            Ok(Outcome::Consume)
        );
        assert!(f.take().is_empty());
    }

    #[test]
    fn non_element_events_are_swallowed() {
        let mut f = Fixture::new();
        assert_eq!(
            f.send(NativeEventKind::DragStart, None, 5.0, 5.0),
            Ok(Outcome::StopAndConsume)
        );
        assert_eq!(
            f.send(NativeEventKind::Drag, None, 5.0, 5.0),
            Ok(Outcome::StopAndConsume)
        );
        assert!(!f.driver.is_dragging());
        let root = f.root;
        assert_eq!(
            f.send(NativeEventKind::DragStart, Some(root), 5.0, 5.0),
            Ok(Outcome::Continue)
        );
        assert!(f.take().is_empty());
    }

    #[test]
    fn nested_elements_resolve_to_innermost_connection() {
        let mut f = Fixture::new();
        let grip = f.grip;
        assert_eq!(
            f.send(NativeEventKind::DragStart, Some(grip), 30.0, 30.0),
            Ok(Outcome::Stop)
        );
        assert_eq!(f.driver.dragged(), Some(f.inner));
        let label = f.a_label;
        assert_eq!(
            f.send(NativeEventKind::DragOver, Some(label), 120.0, 20.0),
            Ok(Outcome::StopAndConsume)
        );
        assert_eq!(
            f.take(),
            vec![Call::Start(f.inner), Call::Enter(f.a), Call::Over(f.a)]
        );
    }

    #[test]
    fn drag_ticks_reach_dragged_source() {
        let mut f = Fixture::new();
        f.start();
        f.drag(30.0, 40.0);
        f.drag(31.0, 41.0);
        assert_eq!(
            f.take(),
            vec![
                Call::Start(f.source),
                Call::Drag(f.source, Point::new(30.0, 40.0)),
                Call::Drag(f.source, Point::new(31.0, 41.0)),
            ]
        );
    }

    #[test]
    fn missing_drag_over_synthesizes_leave_once() {
        let mut f = Fixture::new();
        f.start();
        f.over(f.a);
        f.drag(150.0, 50.0);
        f.over(f.a);
        f.drag(150.0, 50.0);
        assert_eq!(f.driver.over(), Some(f.a));
        f.take();

        f.drag(300.0, 350.0);
        assert_eq!(f.driver.over(), None);
        f.drag(301.0, 351.0);
        f.end(301.0, 351.0);
        assert_eq!(
            f.take(),
            vec![
                Call::Leave(f.a),
                Call::Drag(f.source, Point::new(300.0, 350.0)),
                Call::Drag(f.source, Point::new(301.0, 351.0)),
                Call::End(f.source, Point::new(301.0, 351.0)),
            ]
        );
    }

    #[test]
    fn removed_hovered_target_is_left() {
        let mut f = Fixture::new();
        f.start();
        f.over(f.a);
        let a = f.a;
        f.driver.host_mut().remove(a);
        f.drag(150.0, 50.0);
        f.drag(150.0, 50.0);
        assert!(f.take().contains(&Call::Leave(a)));
        assert_eq!(
            f.send(NativeEventKind::DragOver, Some(a), 150.0, 50.0),
            Err(DragError::InvalidEventTarget { node: Some(a) })
        );
        assert_eq!(f.driver.over(), None);
    }

    #[test]
    fn fallback_replays_document_drag_over() {
        let mut f = Fixture::new();
        f.start();
        f.drag(0.0, 0.0);
        assert!(f.driver.fallback_active());
        // Not armed until the next fallback tick.
        f.document_over(50.0, 60.0);
        f.drag(0.0, 0.0);
        f.document_over(70.0, 80.0);
        assert_eq!(
            f.take(),
            vec![
                Call::Start(f.source),
                Call::Drag(f.source, Point::new(70.0, 80.0)),
            ]
        );

        // A genuine position switches back without being delivered.
        f.drag(5.0, 5.0);
        assert!(!f.driver.fallback_active());
        f.document_over(90.0, 90.0);
        assert!(f.take().is_empty());

        // The latch is closed: origin ticks are dropped, not re-entered.
        f.drag(0.0, 0.0);
        assert!(!f.driver.fallback_active());
        f.drag(6.0, 6.0);
        assert_eq!(f.take(), vec![Call::Drag(f.source, Point::new(6.0, 6.0))]);
    }

    #[test]
    fn fallback_latch_survives_operations() {
        let mut f = Fixture::new();
        f.start();
        f.drag(0.0, 0.0);
        f.drag(5.0, 5.0);
        f.end(5.0, 5.0);
        f.start();
        f.drag(0.0, 0.0);
        assert!(!f.driver.fallback_active());
    }

    #[test]
    fn drag_end_uses_last_position_when_unreliable() {
        let mut f = Fixture::new();
        f.start();
        f.drag(0.0, 0.0);
        f.drag(0.0, 0.0);
        f.document_over(70.0, 80.0);
        f.end(3.0, 4.0);
        assert_eq!(
            f.take().last(),
            Some(&Call::End(f.source, Point::new(70.0, 80.0)))
        );

        let mut f = Fixture::new();
        f.start();
        f.drag(30.0, 30.0);
        f.end(0.0, 0.0);
        assert_eq!(
            f.take().last(),
            Some(&Call::End(f.source, Point::new(30.0, 30.0)))
        );
    }

    #[test]
    fn refused_payload_format_falls_back_to_text() {
        let mut host = MemoryHost::new();
        host.reject_format(PAYLOAD_FORMAT);
        let mut f = Fixture::with_host(host, None);
        f.start();
        assert_eq!(
            f.driver.host().drag_data(),
            &[(String::from(FALLBACK_PAYLOAD_FORMAT), String::new())]
        );

        let mut host = MemoryHost::new();
        host.reject_format(PAYLOAD_FORMAT);
        host.reject_format(FALLBACK_PAYLOAD_FORMAT);
        let mut f = Fixture::with_host(host, None);
        f.start();
        assert!(f.driver.is_dragging());
        assert!(f.driver.host().drag_data().is_empty());
    }

    #[test]
    fn payload_does_not_carry_over_between_drags() {
        let mut f = Fixture::new();
        f.start();
        f.end(30.0, 30.0);
        f.start();
        assert_eq!(
            f.driver.host().drag_data(),
            &[(String::from(PAYLOAD_FORMAT), String::new())]
        );
    }

    #[test]
    fn source_chooses_effect_allowed() {
        let mut f = Fixture::with_host(MemoryHost::new(), Some(EffectAllowed::COPY_MOVE));
        f.start();
        assert_eq!(f.driver.effect_allowed(), Some(EffectAllowed::COPY_MOVE));
        assert_eq!(
            f.driver.host().effect_allowed(),
            Some(EffectAllowed::COPY_MOVE)
        );
    }

    #[test]
    fn refused_drop_still_leaves() {
        let mut f = Fixture::new();
        f.start();
        f.over(f.b);
        f.drop_on(f.b);
        let calls = f.take();
        assert!(!calls.contains(&Call::Drop(f.b)));
        assert_eq!(calls.last(), Some(&Call::Leave(f.b)));
    }

    #[test]
    fn drop_without_over_enters_first() {
        let mut f = Fixture::new();
        f.start();
        f.take();
        f.drop_on(f.a);
        assert_eq!(
            f.take(),
            vec![
                Call::Enter(f.a),
                Call::Over(f.a),
                Call::Drop(f.a),
                Call::Leave(f.a),
            ]
        );
    }

    #[test]
    fn disconnecting_dragged_source_finishes_operation() {
        let mut f = Fixture::new();
        f.start();
        f.drag(150.0, 50.0);
        f.over(f.a);
        f.take();
        let source = f.source;
        f.driver.disconnect_source(source);
        assert_eq!(
            f.take(),
            vec![
                Call::Leave(f.a),
                Call::End(source, Point::new(150.0, 50.0)),
            ]
        );
        assert!(!f.driver.is_dragging());
        assert!(!f.driver.host().is_draggable(source));
        assert_eq!(f.driver.host().cursor(source), Some(Cursor::Auto));
        assert_eq!(
            f.send(NativeEventKind::Drag, Some(source), 1.0, 1.0),
            Ok(Outcome::Continue)
        );
        // Idempotent.
        f.driver.disconnect_source(source);
        assert!(f.take().is_empty());
    }

    #[test]
    fn disconnecting_hovered_target_leaves_it() {
        let mut f = Fixture::new();
        f.start();
        f.over(f.a);
        f.take();
        let a = f.a;
        f.driver.disconnect_target(a);
        assert_eq!(f.take(), vec![Call::Leave(a)]);
        assert_eq!(f.driver.over(), None);
        f.end(1.0, 1.0);
        assert_eq!(f.take(), vec![Call::End(f.source, Point::new(1.0, 1.0))]);
    }

    #[test]
    fn connections_are_unique_and_marked() {
        let mut f = Fixture::new();
        assert!(f.driver.host().is_draggable(f.source));
        assert_eq!(f.driver.host().cursor(f.source), Some(Cursor::Grab));
        assert!(!f.driver.host().is_draggable(f.a));
        let a = f.a;
        let handler: HandlerRef<NodeId> = Rc::new(RefCell::new(Recorder {
            log: Log::default(),
            allowed: None,
            effect: DropEffect::None,
        }));
        assert_eq!(
            f.driver.connect_target(a, handler),
            Err(DragError::DuplicateConnection {
                node: a,
                role: Role::Target
            })
        );
        assert_eq!(f.driver.registry().len(), 4);
    }

    #[test]
    fn disconnect_all_finishes_and_resets() {
        let mut f = Fixture::new();
        f.start();
        f.drag(0.0, 0.0);
        f.drag(5.0, 5.0);
        f.over(f.a);
        f.take();
        f.driver.disconnect_all();
        // The tick that switched fallback off was not delivered.
        assert_eq!(
            f.take(),
            vec![
                Call::Leave(f.a),
                Call::End(f.source, Point::new(10.0, 10.0)),
            ]
        );
        assert!(f.driver.registry().is_empty());
        assert!(!f.driver.host().is_draggable(f.source));

        let source = f.source;
        let handler: HandlerRef<NodeId> = Rc::new(RefCell::new(Recorder {
            log: Rc::clone(&f.log),
            allowed: None,
            effect: DropEffect::None,
        }));
        f.driver.connect_source(source, handler).unwrap();
        f.start();
        f.drag(0.0, 0.0);
        assert!(f.driver.fallback_active());
    }

    type CardHandler = dragline::handler::Handler<&'static str>;

    struct Board {
        driver: Driver<NodeId, MemoryHost>,
        card: NodeId,
        lane: NodeId,
        target: Rc<RefCell<CardHandler>>,
        drops: Rc<core::cell::Cell<u32>>,
    }

    fn board(allowed: EffectAllowed, accepted: DropEffect) -> Board {
        use dragline::context::DragContext;
        use dragline::handler::Handler;
        use dragline::options::{AcceptedTypes, DragSource, DropTarget, HandlerOptions};

        let mut host = MemoryHost::new();
        let card = host.insert(None, Rect::new(0.0, 0.0, 50.0, 50.0));
        let lane = host.insert(None, Rect::new(100.0, 0.0, 200.0, 100.0));
        let ctx = DragContext::new();
        let source: CardHandler = Handler::new(
            ctx.clone(),
            HandlerOptions::new()
                .drag_source(DragSource::new("CARD").on_drag_start(move |_| Some(allowed))),
        )
        .unwrap();
        let drops = Rc::new(core::cell::Cell::new(0));
        let counted = Rc::clone(&drops);
        let target: CardHandler = Handler::new(
            ctx,
            HandlerOptions::new().drop_target(
                DropTarget::new(AcceptedTypes::map([("CARD", accepted)]))
                    .on_drop(move |_| counted.set(counted.get() + 1)),
            ),
        )
        .unwrap();
        let target = Rc::new(RefCell::new(target));
        let mut driver = Driver::new(host);
        driver
            .connect_source(card, Rc::new(RefCell::new(source)))
            .unwrap();
        driver.connect_target(lane, target.clone()).unwrap();
        Board {
            driver,
            card,
            lane,
            target,
            drops,
        }
    }

    impl Board {
        fn send(&mut self, kind: NativeEventKind, node: NodeId) {
            let event = NativeEvent::new(kind, Some(node), Point::new(150.0, 50.0));
            self.driver.handle(event).unwrap();
        }
    }

    #[test]
    fn observers_see_state_while_handler_is_dispatched() {
        use dragline::props::{PropValue, Props};

        let mut b = board(EffectAllowed::ALL, DropEffect::Move);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let observer = move |props: &Props| {
            log.borrow_mut()
                .push(props.get("isOver").and_then(PropValue::as_bool));
        };
        b.target
            .borrow_mut()
            .set_over_state_callback(Some(alloc::boxed::Box::new(observer)));

        let (card, lane) = (b.card, b.lane);
        b.send(NativeEventKind::DragStart, card);
        b.send(NativeEventKind::DragOver, lane);
        assert_eq!(*seen.borrow(), vec![Some(true)]);
        b.send(NativeEventKind::Drop, lane);
        assert_eq!(*seen.borrow(), vec![Some(true), Some(false)]);
        assert_eq!(b.drops.get(), 1);
        assert!(b.target.try_borrow().is_ok());
    }

    #[test]
    fn forbidden_effect_is_never_advertised() {
        let mut b = board(EffectAllowed::COPY, DropEffect::Move);
        let (card, lane) = (b.card, b.lane);
        b.send(NativeEventKind::DragStart, card);
        b.send(NativeEventKind::DragOver, lane);
        assert_eq!(b.driver.last_effect(), DropEffect::None);
        assert!(!b.target.borrow().is_over());
        b.send(NativeEventKind::Drop, lane);
        assert_eq!(b.drops.get(), 0);
        assert!(!b.target.borrow().is_over());
    }
}
