// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler construction errors.

use thiserror::Error;

/// Errors raised while building a [`Handler`](crate::handler::Handler).
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerError {
    /// Neither a drag source nor a drop target was configured.
    #[error("dragSource and/or dropTarget must be configured")]
    MissingRole,
}
