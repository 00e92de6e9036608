// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dragline Driver: turns a host's unreliable native drag-and-drop events into
//! the [`dragline`] protocol.
//!
//! ## Overview
//!
//! The host hands every native drag event to a [`Driver`](crate::driver::Driver)
//! and applies the returned [`Outcome`](crate::types::Outcome). The driver keeps
//! a [`Registry`](crate::registry::Registry) of connected sources and targets,
//! owns the single operation in progress, and emits well-ordered protocol calls
//! to the connected handlers.
//!
//! ## Inputs
//!
//! A [`NativeEvent`](crate::types::NativeEvent) carries the event kind, the
//! element it originated at, the pointer position and modifier keys. Events
//! bubble: the element that handles one is the innermost connected element on
//! the path from the origin to the root (see [`route`](crate::route)).
//!
//! ## Host
//!
//! The environment is abstracted by [`Host`](crate::types::Host): a parent
//! lookup, bounding boxes, and a few writes (draggable flag, cursor, payload,
//! allowed effects). [`MemoryHost`](crate::memory::MemoryHost) is a ready-made
//! in-memory implementation.
//!
//! ## Errors
//!
//! Protocol violations come back as [`DragError`](crate::error::DragError) and
//! never corrupt driver state. Drag-over and drop events with no operation in
//! progress are expected races and are not errors.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod driver;
pub mod error;
pub mod memory;
pub mod normalize;
pub mod registry;
pub mod route;
pub mod types;
