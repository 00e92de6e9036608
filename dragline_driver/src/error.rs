// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Driver errors.

use alloc::string::String;

use thiserror::Error;

use crate::types::Role;

/// Protocol violations reported by the [`Driver`](crate::driver::Driver).
///
/// None of these corrupt driver state: the offending call is rejected and the
/// operation in progress (if any) is unaffected.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragError<K> {
    /// The event target has no measurable bounding box.
    #[error("invalid event target {node:?}: no measurable bounds")]
    InvalidEventTarget {
        /// The element the event was resolved to, if any.
        node: Option<K>,
    },
    /// The element is already connected in this role.
    #[error("{node:?} is already connected as a {role}")]
    DuplicateConnection {
        /// The element.
        node: K,
        /// The role it was connected in twice.
        role: Role,
    },
    /// A drag start arrived while another operation is active.
    #[error("cannot start dragging: operation on {dragged:?} in progress")]
    OperationAlreadyInProgress {
        /// Source of the operation in progress.
        dragged: K,
    },
    /// A drag tick or drag end arrived with no operation active.
    #[error("no drag operation in progress")]
    NoOperationInProgress,
}

/// The host refused to attach drag payload data.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("data transfer rejected format `{format}`")]
pub struct DataTransferError {
    /// Format that was refused.
    pub format: String,
}

impl DataTransferError {
    /// A refusal of `format`.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}
