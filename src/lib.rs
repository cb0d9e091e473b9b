// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

pub mod channel;
pub mod cloud;
pub mod light;
pub mod manager;
pub mod usb;
pub mod util;

pub mod configuration;
pub mod errors;
pub mod startup;

pub use startup::*;
