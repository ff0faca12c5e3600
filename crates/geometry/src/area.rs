// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Signed polygon area via the shoelace formula.
//!
//! The area is half the sum of `prev × next` over every edge, including
//! the closing edge from the last vertex back to the first. Counter-clockwise
//! polygons have positive area, clockwise ones negative.
//!
//! Two forms of the per-edge term are provided:
//! - [`edge_term`] is exact (128-bit) and used by the host path.
//! - [`edge_term_wrapping`] mirrors a device `long`: 64-bit, two's-complement
//!   wrapping. Sums of wrapped terms agree with the exact sum whenever the
//!   final doubled area fits in 64 bits.

use crate::point::{Area, Point2};
use crate::polygon::closed_edges;

/// Exact doubled-area contribution of the edge `prev → next`.
pub fn edge_term(prev: Point2, next: Point2) -> i128 {
    prev.x as i128 * next.y as i128 - prev.y as i128 * next.x as i128
}

/// Doubled-area contribution of `prev → next` in wrapping 64-bit arithmetic.
pub fn edge_term_wrapping(prev: Point2, next: Point2) -> i64 {
    (prev.x as i64 * next.y as i64).wrapping_sub(prev.y as i64 * next.x as i64)
}

/// Halves a doubled area, truncating toward zero and saturating to [`Area`].
///
/// Truncation toward zero keeps `halve(-d) == -halve(d)`, so reversing a
/// polygon's winding exactly negates its area.
pub fn halve(doubled: i128) -> Area {
    let half = doubled / 2;
    Area::try_from(half).unwrap_or(if half < 0 { Area::MIN } else { Area::MAX })
}

/// Signed area of the closed polygon through `vertices`.
///
/// Fewer than three vertices enclose nothing and yield `0`.
pub fn area_host(vertices: &[Point2]) -> Area {
    if vertices.len() < 3 {
        return 0;
    }
    let doubled: i128 = closed_edges(vertices)
        .map(|(prev, next)| edge_term(prev, next))
        .sum();
    halve(doubled)
}
