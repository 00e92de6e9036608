// Copyright 2025 the Dragline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure conversions from native events to protocol records.

use dragline::types::{DragStatus, MouseOverStatus};
use kurbo::Point;

use crate::error::DragError;
use crate::types::{Host, NativeEvent};

/// Viewport coordinates of `event`.
pub fn to_point<K>(event: &NativeEvent<K>) -> Point {
    event.position
}

/// Whether `point` is exactly the viewport origin.
///
/// Some hosts report this in place of real coordinates on drag ticks.
pub fn is_origin(point: Point) -> bool {
    point.x == 0.0 && point.y == 0.0
}

/// Pointer status of `event` relative to `current`, the element it is being
/// handled on.
///
/// Fails with [`DragError::InvalidEventTarget`] when `current` has no bounds,
/// or bounds that are non-finite or negatively sized.
pub fn to_status<K: Copy, H: Host<K>>(
    event: &NativeEvent<K>,
    current: K,
    host: &H,
) -> Result<DragStatus, DragError<K>> {
    let invalid = || DragError::InvalidEventTarget {
        node: Some(current),
    };
    let bounds = host.bounds_of(&current).ok_or_else(invalid)?;
    if !bounds.is_finite() || bounds.width() < 0.0 || bounds.height() < 0.0 {
        return Err(invalid());
    }
    let position = to_point(event);
    Ok(DragStatus {
        mouse: MouseOverStatus {
            position,
            offset: position - bounds.origin(),
            size: bounds.size(),
        },
        modifiers: event.modifiers,
    })
}
