// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragline: per-element drag-and-drop state machines over a canonical protocol.
//!
//! ## Overview
//!
//! Native drag-and-drop event streams differ between hosts: some send a zero
//! position on every drag tick, some refuse custom payload types, some never
//! deliver a final position. A *driver* (see the `dragline_driver` crate)
//! absorbs those differences and emits a small, well-ordered protocol. This
//! crate defines that protocol and the [`Handler`](crate::handler::Handler)
//! that consumes it for a single element.
//!
//! ## Protocol
//!
//! [`SourceHandler`](crate::protocol::SourceHandler) receives
//! `drag_start → drag* → drag_end` for the element being dragged.
//! [`TargetHandler`](crate::protocol::TargetHandler) receives
//! `drag_enter → drag_over* → (drop?) → drag_leave` for each element the
//! pointer hovers. Every enter is matched by exactly one leave.
//!
//! ## Handlers
//!
//! A handler is configured once with [`HandlerOptions`](crate::options::HandlerOptions):
//! a [`DragSource`](crate::options::DragSource), a [`DropTarget`](crate::options::DropTarget),
//! or both. It exposes three pieces of derived state (`isDragging`, `isOver`,
//! `isOverEdge`) and notifies observers only when they change.
//!
//! Handlers on one drag surface share a [`DragContext`](crate::context::DragContext),
//! through which a target learns the type of the item being dragged.
//!
//! ## Effects
//!
//! A source chooses its [`EffectAllowed`](crate::types::EffectAllowed) set on
//! drag start. A target negotiates a [`DropEffect`](crate::types::DropEffect)
//! from its [`AcceptedTypes`](crate::options::AcceptedTypes) on enter, may
//! refine it per tick, and the result is filtered by what the source allows.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub use kurbo;

pub mod context;
pub mod error;
pub mod handler;
pub mod options;
pub mod props;
pub mod protocol;
pub mod types;
