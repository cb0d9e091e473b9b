// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Crownstone light entity: command routing, brightness scales and host entity mapping.

mod command;
mod controller;
mod entity;
pub mod scale;

pub use command::*;
pub use controller::*;
pub use entity::*;
