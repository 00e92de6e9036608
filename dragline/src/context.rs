// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag context shared by all handlers of one drag surface.
//!
//! A target decides its [`DropEffect`](crate::types::DropEffect) from the type of
//! the item being dragged, which is known only to the source's handler. Every
//! [`Handler`](crate::handler::Handler) of a surface is constructed with a clone
//! of the same [`DragContext`]; the source publishes its [`SourceData`] on drag
//! start and withdraws it on drag end. The effects the source allows are
//! published alongside, so targets can refuse a drop as soon as they are
//! entered.
//!
//! Independent surfaces (or tests) simply use independent contexts.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::types::{EffectAllowed, SourceData};

/// Shared slot holding the [`SourceData`] of the operation in progress.
pub struct DragContext<T, D = ()> {
    current: Rc<RefCell<Option<Rc<SourceData<T, D>>>>>,
    allowed: Rc<Cell<EffectAllowed>>,
}

impl<T, D> DragContext<T, D> {
    /// Create an empty context (no operation in progress).
    pub fn new() -> Self {
        Self {
            current: Rc::new(RefCell::new(None)),
            allowed: Rc::new(Cell::new(EffectAllowed::ALL)),
        }
    }

    /// The source data of the operation in progress, if any.
    pub fn current(&self) -> Option<Rc<SourceData<T, D>>> {
        self.current.borrow().clone()
    }

    /// Whether an operation is in progress on this surface.
    pub fn is_active(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Effects the source allows for the operation in progress.
    ///
    /// [`EffectAllowed::ALL`] when no operation is in progress.
    pub fn effect_allowed(&self) -> EffectAllowed {
        self.allowed.get()
    }

    pub(crate) fn begin(&self, data: Rc<SourceData<T, D>>) {
        *self.current.borrow_mut() = Some(data);
        self.allowed.set(EffectAllowed::ALL);
    }

    pub(crate) fn allow(&self, effect: EffectAllowed) {
        self.allowed.set(effect);
    }

    pub(crate) fn end(&self) {
        self.current.borrow_mut().take();
        self.allowed.set(EffectAllowed::ALL);
    }
}

impl<T, D> Default for DragContext<T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D> Clone for DragContext<T, D> {
    fn clone(&self) -> Self {
        Self {
            current: Rc::clone(&self.current),
            allowed: Rc::clone(&self.allowed),
        }
    }
}

impl<T: fmt::Debug, D: fmt::Debug> fmt::Debug for DragContext<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragContext")
            .field("current", &self.current.borrow())
            .field("allowed", &self.allowed.get())
            .finish()
    }
}
