// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Accelerator winding-number tally.

use super::reduce_in_passes;
use crate::{DispatchContext, DispatchError};
use compute_backend::{kernels, DeviceId, KernelArg};
use geometry::{Point2, WindingTally};

/// Winding number and boundary hits of `point` against the closed polygon
/// through `vertices`, computed on `device`.
pub(crate) fn tally_device(
    context: &DispatchContext,
    device: DeviceId,
    vertices: &[Point2],
    point: Point2,
) -> Result<WindingTally, DispatchError> {
    let partials: Vec<[i32; 2]> = reduce_in_passes(
        context,
        device,
        &kernels::CONTAINS,
        kernels::CONTAINS_KERNEL,
        vertices,
        |input, edges, output, scratch| {
            vec![
                KernelArg::Buffer(input),
                KernelArg::U64(edges),
                KernelArg::Point(point),
                KernelArg::Buffer(output),
                KernelArg::Local(scratch),
            ]
        },
    )?;
    Ok(partials
        .into_iter()
        .map(|[winding, hits]| WindingTally {
            winding: winding as i64,
            boundary_hits: hits.max(0) as u64,
        })
        .fold(WindingTally::default(), WindingTally::merge))
}
