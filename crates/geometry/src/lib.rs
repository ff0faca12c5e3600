// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # geometry
//!
//! Integer-coordinate polygon types and the host reference algorithms.
//!
//! This crate provides:
//! - [`Point2`]: an `i32` point, plain-old-data so vertex slices upload to
//!   device buffers as raw bytes.
//! - [`SimplePolygon`] and [`Polygon`] (outer boundary plus holes).
//! - [`area_host`]: shoelace signed area.
//! - [`contains_host`]: winding-number point-in-polygon with explicit
//!   boundary handling, [`FillType`] and [`EdgeInclusion`].
//!
//! The per-edge functions ([`edge_term_wrapping`], [`classify_edge`]) are
//! public so accelerator kernels apply exactly the same rules.

mod area;
mod contains;
mod error;
mod point;
mod polygon;

pub use area::{area_host, edge_term, edge_term_wrapping, halve};
pub use contains::{
    classify_edge, contains_host, tally_edges, EdgeCrossing, EdgeInclusion, FillType,
    WindingTally,
};
pub use error::GeometryError;
pub use point::{Area, Coord, Point2};
pub use polygon::{closed_edges, Polygon, SimplePolygon};
