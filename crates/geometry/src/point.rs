// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integer points and the orientation predicates every algorithm builds on.

use std::fmt;
use std::ops::{Add, Sub};

/// Vertex coordinate type.
pub type Coord = i32;

/// Signed area type, double the width of [`Coord`].
pub type Area = i64;

/// A point on the integer plane.
///
/// The layout is `#[repr(C)]` and [`bytemuck::Pod`], so a vertex slice can
/// be uploaded to a device buffer as raw bytes with `bytemuck::cast_slice`.
/// Serialises as a two-element array `[x, y]`.
#[repr(C)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(from = "[Coord; 2]", into = "[Coord; 2]")]
pub struct Point2 {
    pub x: Coord,
    pub y: Coord,
}

impl Point2 {
    /// Size of one vertex in a device buffer.
    pub const BYTES: usize = std::mem::size_of::<Point2>();

    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Returns this point moved by `(dx, dy)`, wrapping at the `i32` range.
    pub fn translate(self, dx: Coord, dy: Coord) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }

    /// Orientation of `self` relative to the directed line `start → end`.
    ///
    /// Positive when the point is left of the line, negative when it is
    /// right of it, zero when the three points are collinear. Computed in
    /// 128-bit so no pair of `i32` inputs can overflow.
    pub fn is_left_of_segment(self, start: Point2, end: Point2) -> i128 {
        let ex = end.x as i128 - start.x as i128;
        let ey = end.y as i128 - start.y as i128;
        let px = self.x as i128 - start.x as i128;
        let py = self.y as i128 - start.y as i128;
        ex * py - ey * px
    }

    /// Returns `true` if the point lies on the closed segment `start..=end`.
    ///
    /// A degenerate segment (`start == end`) contains only that point.
    pub fn lies_on_segment(self, start: Point2, end: Point2) -> bool {
        self.is_left_of_segment(start, end) == 0
            && self.x >= start.x.min(end.x)
            && self.x <= start.x.max(end.x)
            && self.y >= start.y.min(end.y)
            && self.y <= start.y.max(end.y)
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<[Coord; 2]> for Point2 {
    fn from([x, y]: [Coord; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2> for [Coord; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

impl From<(Coord, Coord)> for Point2 {
    fn from((x, y): (Coord, Coord)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_left_sign() {
        let a = Point2::new(0, 0);
        let b = Point2::new(10, 0);
        assert!(Point2::new(5, 5).is_left_of_segment(a, b) > 0);
        assert!(Point2::new(5, -5).is_left_of_segment(a, b) < 0);
        assert_eq!(Point2::new(20, 0).is_left_of_segment(a, b), 0);
    }

    #[test]
    fn test_is_left_extreme_coordinates() {
        let a = Point2::new(Coord::MIN, Coord::MIN);
        let b = Point2::new(Coord::MAX, Coord::MIN);
        let p = Point2::new(0, Coord::MAX);
        assert!(p.is_left_of_segment(a, b) > 0);
    }

    #[test]
    fn test_lies_on_segment() {
        let a = Point2::new(0, 0);
        let b = Point2::new(4, 4);
        assert!(Point2::new(2, 2).lies_on_segment(a, b));
        assert!(Point2::new(0, 0).lies_on_segment(a, b));
        assert!(Point2::new(4, 4).lies_on_segment(a, b));
        assert!(!Point2::new(5, 5).lies_on_segment(a, b));
        assert!(!Point2::new(2, 3).lies_on_segment(a, b));
    }

    #[test]
    fn test_degenerate_segment() {
        let a = Point2::new(3, 3);
        assert!(Point2::new(3, 3).lies_on_segment(a, a));
        assert!(!Point2::new(3, 4).lies_on_segment(a, a));
    }

    #[test]
    fn test_arithmetic_and_translate() {
        let p = Point2::new(1, 2) + Point2::new(3, 4);
        assert_eq!(p, Point2::new(4, 6));
        assert_eq!(p - Point2::new(4, 6), Point2::default());
        assert_eq!(p.translate(-4, 1), Point2::new(0, 7));
    }

    #[test]
    fn test_translate_wraps_at_range() {
        let p = Point2::new(i32::MAX, i32::MIN);
        assert_eq!(p.translate(1, -1), Point2::new(i32::MIN, i32::MAX));
    }

    #[test]
    fn test_pod_layout() {
        assert_eq!(Point2::BYTES, 8);
        let pts = [Point2::new(1, 2), Point2::new(3, 4)];
        let bytes: &[u8] = bytemuck::cast_slice(&pts);
        assert_eq!(bytes.len(), 16);
        let back: Vec<Point2> = bytemuck::pod_collect_to_vec(bytes);
        assert_eq!(back, pts);
    }

    #[test]
    fn test_serde_as_pair() {
        let json = serde_json::to_string(&Point2::new(-3, 7)).unwrap();
        assert_eq!(json, "[-3,7]");
        let back: Point2 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Point2::new(-3, 7));
    }
}
