// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Point-in-polygon by winding number.
//!
//! A ray is cast from the query point in the +X direction. Each edge is
//! classified independently by [`classify_edge`]:
//!
//! - an upward edge (`prev.y <= p.y < next.y`) with the point strictly to its
//!   left contributes `+1`;
//! - a downward edge (`next.y <= p.y < prev.y`) with the point strictly to
//!   its right contributes `-1`;
//! - horizontal edges never cross;
//! - an edge the point lies on is a boundary hit.
//!
//! The half-open `[low, high)` interval makes a vertex on the ray count with
//! exactly one of its two edges. Boundary hits override the winding number,
//! so the result for points on an edge does not depend on orientation.

use crate::point::Point2;
use crate::polygon::closed_edges;

/// Rule turning a winding number into inside/outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillType {
    /// Inside when the winding number is odd.
    #[default]
    EvenOdd,
    /// Inside when the winding number is non-zero.
    NonZero,
}

impl FillType {
    pub fn is_inside(self, winding: i64) -> bool {
        match self {
            FillType::EvenOdd => winding.rem_euclid(2) == 1,
            FillType::NonZero => winding != 0,
        }
    }
}

/// Whether points lying exactly on an edge count as inside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeInclusion {
    #[default]
    Inside,
    Outside,
}

/// How one edge relates to the ray cast from the query point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeCrossing {
    None,
    Up,
    Down,
    Boundary,
}

impl EdgeCrossing {
    /// Contribution of this crossing to the winding number.
    pub fn winding_delta(self) -> i32 {
        match self {
            EdgeCrossing::Up => 1,
            EdgeCrossing::Down => -1,
            EdgeCrossing::None | EdgeCrossing::Boundary => 0,
        }
    }

    pub fn is_boundary(self) -> bool {
        self == EdgeCrossing::Boundary
    }
}

/// Classifies the edge `prev → next` against the +X ray from `point`.
pub fn classify_edge(prev: Point2, next: Point2, point: Point2) -> EdgeCrossing {
    if point.lies_on_segment(prev, next) {
        return EdgeCrossing::Boundary;
    }
    if prev.y <= point.y && next.y > point.y {
        if point.is_left_of_segment(prev, next) > 0 {
            return EdgeCrossing::Up;
        }
    } else if prev.y > point.y && next.y <= point.y && point.is_left_of_segment(prev, next) < 0 {
        return EdgeCrossing::Down;
    }
    EdgeCrossing::None
}

/// Accumulated winding number and boundary hits for one query point.
///
/// Tallies from separate edge ranges (device passes, polygon boundaries)
/// combine with [`WindingTally::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindingTally {
    pub winding: i64,
    pub boundary_hits: u64,
}

impl WindingTally {
    pub fn record(&mut self, crossing: EdgeCrossing) {
        self.winding += crossing.winding_delta() as i64;
        if crossing.is_boundary() {
            self.boundary_hits += 1;
        }
    }

    pub fn merge(self, other: WindingTally) -> WindingTally {
        WindingTally {
            winding: self.winding + other.winding,
            boundary_hits: self.boundary_hits + other.boundary_hits,
        }
    }

    /// Final inside/outside decision.
    pub fn resolve(self, inclusion: EdgeInclusion, fill: FillType) -> bool {
        if self.boundary_hits > 0 {
            return inclusion == EdgeInclusion::Inside;
        }
        fill.is_inside(self.winding)
    }
}

/// Classifies every edge of the closed polygon through `vertices`.
pub fn tally_edges(vertices: &[Point2], point: Point2) -> WindingTally {
    let mut tally = WindingTally::default();
    for (prev, next) in closed_edges(vertices) {
        tally.record(classify_edge(prev, next, point));
    }
    tally
}

/// Host winding-number containment test.
///
/// Zero vertices contain nothing. One or two vertices describe a point or a
/// segment: the query point is inside only if it lies on that shape and
/// `inclusion` is [`EdgeInclusion::Inside`].
pub fn contains_host(
    vertices: &[Point2],
    point: Point2,
    inclusion: EdgeInclusion,
    fill: FillType,
) -> bool {
    match vertices {
        [] => false,
        [only] => inclusion == EdgeInclusion::Inside && *only == point,
        [a, b] => inclusion == EdgeInclusion::Inside && point.lies_on_segment(*a, *b),
        _ => tally_edges(vertices, point).resolve(inclusion, fill),
    }
}
