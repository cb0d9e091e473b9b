// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use crate::cloud::Abilities;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strum::{AsRefStr, Display, EnumString};

/// Maximum Crownstone switch state value: fully on.
pub const STATE_ON: u8 = 100;
/// Crownstone switch state value: off.
pub const STATE_OFF: u8 = 0;

/// Crownstone hardware model category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, Deserialize, Serialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Plug,
    Builtin,
    BuiltinOne,
    CrownstoneUsb,
    Guidestone,
    #[serde(other)]
    Unknown,
}

impl DeviceType {
    /// Model name of a switchable Crownstone.
    ///
    /// Returns `None` for device types which can't be switched or dimmed and are therefore not
    /// exposed as light entity.
    pub fn model_label(&self) -> Option<&'static str> {
        match self {
            DeviceType::Plug => Some("Plug"),
            DeviceType::Builtin => Some("Built-in"),
            DeviceType::BuiltinOne => Some("Built-in One"),
            DeviceType::CrownstoneUsb | DeviceType::Guidestone | DeviceType::Unknown => None,
        }
    }

    pub fn is_switchable(&self) -> bool {
        self.model_label().is_some()
    }
}

/// A physical Crownstone switch or dimmer unit.
#[derive(Debug, Clone, PartialEq, Builder, Deserialize, Serialize)]
#[builder(setter(into))]
pub struct Device {
    /// Cloud identifier, unique across all spheres.
    pub cloud_id: String,
    /// Crownstone id within its sphere, used for addressing the device over the USB dongle.
    pub uid: u8,
    pub name: String,
    /// Switch state in the Crownstone scale: 0 = off, 100 = fully on.
    #[builder(default)]
    #[serde(default)]
    pub state: u8,
    #[builder(default)]
    #[serde(default)]
    pub abilities: Abilities,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub sw_version: Option<String>,
}

/// Device reference shared between the cloud data and the light controllers.
pub type SharedDevice = Arc<Mutex<Device>>;

/// Lock a shared device.
///
/// A poisoned lock is recovered: the device data is only plain values and stays consistent.
pub fn lock_device(device: &SharedDevice) -> MutexGuard<'_, Device> {
    device.lock().unwrap_or_else(PoisonError::into_inner)
}
