// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Crownstone cloud data model: spheres, Crownstones and their abilities.
//!
//! The data is owned by the cloud client and shared with the light controllers, which update the
//! Crownstone state optimistically after sending a command.

mod ability;
mod device;
mod sphere;

pub use ability::*;
pub use device::*;
pub use sphere::*;
