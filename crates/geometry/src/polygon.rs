// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Simple polygons and multi-boundary polygons.

use crate::area::area_host;
use crate::contains::{contains_host, tally_edges, EdgeInclusion, FillType, WindingTally};
use crate::point::{Area, Coord, Point2};
use crate::GeometryError;
use std::path::Path;

/// Iterates the edges of the closed polygon through `vertices`, ending with
/// the wrap-around edge from the last vertex to the first.
pub fn closed_edges(vertices: &[Point2]) -> impl Iterator<Item = (Point2, Point2)> + '_ {
    vertices
        .iter()
        .copied()
        .zip(vertices.iter().copied().cycle().skip(1))
}

/// A single closed boundary given by its vertices in traversal order.
///
/// The closing edge is implicit: the first vertex is not repeated.
/// Serialises as a list of `[x, y]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SimplePolygon {
    vertices: Vec<Point2>,
}

impl SimplePolygon {
    pub fn new(vertices: Vec<Point2>) -> Self {
        Self { vertices }
    }

    /// Parses a JSON array of `[x, y]` pairs.
    pub fn from_json(json: &str) -> Result<Self, GeometryError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    pub fn first(&self) -> Option<Point2> {
        self.vertices.first().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point2> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        closed_edges(&self.vertices)
    }

    pub fn push(&mut self, vertex: Point2) {
        self.vertices.push(vertex);
    }

    pub fn translate(&mut self, dx: Coord, dy: Coord) {
        for v in &mut self.vertices {
            *v = v.translate(dx, dy);
        }
    }

    /// Signed area computed on the host.
    pub fn area(&self) -> Area {
        area_host(&self.vertices)
    }

    /// Host containment test; see [`contains_host`].
    pub fn contains(&self, point: Point2, inclusion: EdgeInclusion, fill: FillType) -> bool {
        contains_host(&self.vertices, point, inclusion, fill)
    }
}

impl From<Vec<Point2>> for SimplePolygon {
    fn from(vertices: Vec<Point2>) -> Self {
        Self::new(vertices)
    }
}

impl FromIterator<Point2> for SimplePolygon {
    fn from_iter<I: IntoIterator<Item = Point2>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SimplePolygon {
    type Item = &'a Point2;
    type IntoIter = std::slice::Iter<'a, Point2>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}

/// A region bounded by several simple polygons: an outer boundary plus holes.
///
/// Holes are expected to wind opposite to the outer boundary, so summing
/// signed areas subtracts them and summing winding numbers cancels inside
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    boundaries: Vec<SimplePolygon>,
}

impl Polygon {
    pub fn new(boundaries: Vec<SimplePolygon>) -> Self {
        Self { boundaries }
    }

    /// Parses either a single boundary (`[[x, y], ...]`) or a list of
    /// boundaries (`[[[x, y], ...], ...]`).
    pub fn from_json(json: &str) -> Result<Self, GeometryError> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Single(SimplePolygon),
            Multi(Vec<SimplePolygon>),
        }

        match serde_json::from_str::<Shape>(json)? {
            Shape::Single(boundary) => Ok(Self::new(vec![boundary])),
            Shape::Multi(boundaries) => Ok(Self::new(boundaries)),
        }
    }

    /// Reads a polygon JSON file; see [`Polygon::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, GeometryError> {
        let content = std::fs::read_to_string(path).map_err(|e| GeometryError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn boundaries(&self) -> &[SimplePolygon] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn push(&mut self, boundary: SimplePolygon) {
        self.boundaries.push(boundary);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimplePolygon> {
        self.boundaries.iter()
    }

    /// Total number of vertices over all boundaries.
    pub fn vertex_count(&self) -> usize {
        self.boundaries.iter().map(SimplePolygon::len).sum()
    }

    pub fn translate(&mut self, dx: Coord, dy: Coord) {
        for b in &mut self.boundaries {
            b.translate(dx, dy);
        }
    }

    /// Sum of the boundaries' signed areas.
    pub fn area(&self) -> Area {
        self.boundaries
            .iter()
            .fold(0, |acc: Area, b| acc.saturating_add(b.area()))
    }

    /// Containment against all boundaries at once.
    ///
    /// Winding numbers add across boundaries; a point on any boundary edge
    /// is decided by `inclusion`.
    pub fn contains(&self, point: Point2, inclusion: EdgeInclusion, fill: FillType) -> bool {
        if let [only] = self.boundaries.as_slice() {
            return only.contains(point, inclusion, fill);
        }
        self.boundaries
            .iter()
            .filter(|b| !b.is_empty())
            .map(|b| tally_edges(b.vertices(), point))
            .fold(WindingTally::default(), WindingTally::merge)
            .resolve(inclusion, fill)
    }
}

impl From<SimplePolygon> for Polygon {
    fn from(boundary: SimplePolygon) -> Self {
        Self::new(vec![boundary])
    }
}

impl From<Vec<SimplePolygon>> for Polygon {
    fn from(boundaries: Vec<SimplePolygon>) -> Self {
        Self::new(boundaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> SimplePolygon {
        SimplePolygon::from(vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ])
    }

    fn with_hole() -> Polygon {
        let outer = rect(0, 0, 100, 100);
        let mut hole = rect(25, 25, 75, 75);
        hole = SimplePolygon::new(hole.vertices().iter().rev().copied().collect());
        Polygon::new(vec![outer, hole])
    }

    #[test]
    fn test_closed_edges_wraps() {
        let sq = rect(0, 0, 1, 1);
        let edges: Vec<_> = sq.edges().collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[3], (Point2::new(0, 1), Point2::new(0, 0)));
        assert_eq!(closed_edges(&[]).count(), 0);
    }

    #[test]
    fn test_area_subtracts_hole() {
        assert_eq!(with_hole().area(), 10_000 - 2_500);
    }

    #[test]
    fn test_contains_respects_hole() {
        let p = with_hole();
        let ins = EdgeInclusion::Inside;
        assert!(p.contains(Point2::new(10, 10), ins, FillType::EvenOdd));
        assert!(!p.contains(Point2::new(50, 50), ins, FillType::EvenOdd));
        assert!(!p.contains(Point2::new(50, 50), ins, FillType::NonZero));
        assert!(p.contains(Point2::new(25, 50), ins, FillType::NonZero));
        assert!(!p.contains(Point2::new(25, 50), EdgeInclusion::Outside, FillType::NonZero));
    }

    #[test]
    fn test_translate_moves_every_boundary() {
        let mut p = with_hole();
        p.translate(10, -10);
        assert_eq!(p.boundaries()[0].vertices()[0], Point2::new(10, -10));
        assert_eq!(p.boundaries()[1].vertices()[0], Point2::new(25 + 10, 75 - 10));
        assert_eq!(p.area(), 7_500);
    }

    #[test]
    fn test_json_single_and_multi() {
        let single = Polygon::from_json("[[0,0],[4,0],[4,4],[0,4]]").unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.area(), 16);

        let multi = Polygon::from_json("[[[0,0],[4,0],[4,4],[0,4]],[[1,1],[1,2],[2,2],[2,1]]]").unwrap();
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.area(), 15);
        assert_eq!(multi.vertex_count(), 8);
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(matches!(
            SimplePolygon::from_json("{\"x\": 1}"),
            Err(GeometryError::Json(_))
        ));
    }

    #[test]
    fn test_simple_polygon_roundtrip() {
        let sq = rect(-1, -2, 3, 4);
        let json = serde_json::to_string(&sq).unwrap();
        assert_eq!(json, "[[-1,-2],[3,-2],[3,4],[-1,4]]");
        assert_eq!(SimplePolygon::from_json(&json).unwrap(), sq);
    }
}
