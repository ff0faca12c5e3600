// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Accelerator signed area.

use super::reduce_in_passes;
use crate::{DispatchContext, DispatchError};
use compute_backend::{kernels, DeviceId, KernelArg};
use geometry::{halve, Area, Point2};

/// Signed area of the closed polygon through `vertices`, computed on `device`.
///
/// Callers route fewer than three vertices to the host.
pub(crate) fn area_device(context: &DispatchContext, device: DeviceId, vertices: &[Point2]) -> Result<Area, DispatchError> {
    let partials: Vec<i64> = reduce_in_passes(
        context,
        device,
        &kernels::AREA,
        kernels::AREA_KERNEL,
        vertices,
        |input, edges, output, scratch| {
            vec![
                KernelArg::Buffer(input),
                KernelArg::U64(edges),
                KernelArg::Buffer(output),
                KernelArg::Local(scratch),
            ]
        },
    )?;
    let doubled = partials.into_iter().fold(0i64, i64::wrapping_add);
    Ok(halve(doubled as i128))
}
