// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! OpenCL C kernel sources shipped with the crate.

/// A named kernel source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSource {
    /// Cache key; unique per source.
    pub name: &'static str,
    pub code: &'static str,
}

impl KernelSource {
    /// Entry points declared in this source.
    pub fn entry_points(&self) -> Vec<&'static str> {
        entry_points(self.code)
    }
}

/// Per-edge area terms with a work-group reduction.
pub const AREA: KernelSource = KernelSource {
    name: "area",
    code: include_str!("../kernels/area.cl"),
};

/// Per-edge winding contributions with a work-group reduction.
pub const CONTAINS: KernelSource = KernelSource {
    name: "contains",
    code: include_str!("../kernels/contains.cl"),
};

/// Per-entry area terms over a packed batch.
pub const BATCH_AREA: KernelSource = KernelSource {
    name: "batch_area",
    code: include_str!("../kernels/batch_area.cl"),
};

pub const AREA_KERNEL: &str = "area_reduce";
pub const CONTAINS_KERNEL: &str = "winding_reduce";
pub const BATCH_AREA_KERNEL: &str = "batch_edge_terms";

/// Scans `code` for `__kernel void <name>(` declarations.
pub fn entry_points(code: &str) -> Vec<&str> {
    code.match_indices("__kernel")
        .filter_map(|(at, keyword)| {
            let rest = code[at + keyword.len()..].trim_start();
            let rest = rest.strip_prefix("void")?.trim_start();
            let end = rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))?;
            (end > 0).then(|| &rest[..end])
        })
        .collect()
}
