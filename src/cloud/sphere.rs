// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

use crate::cloud::{Device, DeviceType, SharedDevice, lock_device};
use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Devices of one physical location.
#[derive(Debug)]
pub struct Sphere {
    pub cloud_id: String,
    pub name: String,
    pub crownstones: Vec<SharedDevice>,
}

impl Sphere {
    /// Find a Crownstone in this sphere by its uid.
    pub fn find_by_uid(&self, uid: u8) -> Option<&SharedDevice> {
        self.crownstones.iter().find(|d| lock_device(d).uid == uid)
    }

    /// Check if the sphere contains a Crownstone USB dongle.
    pub fn has_usb_dongle(&self) -> bool {
        self.crownstones
            .iter()
            .any(|d| lock_device(d).device_type == DeviceType::CrownstoneUsb)
    }
}

/// All spheres of a Crownstone account.
#[derive(Debug, Default)]
pub struct CloudData {
    pub spheres: Vec<Sphere>,
}

impl CloudData {
    /// Find a sphere by its cloud id.
    pub fn find_by_id(&self, sphere_id: &str) -> Option<&Sphere> {
        self.spheres.iter().find(|s| s.cloud_id == sphere_id)
    }

    /// Find a Crownstone by its uid in any sphere.
    ///
    /// The uid is only unique within a sphere, the last match wins.
    pub fn find_by_uid(&self, uid: u8) -> Option<&SharedDevice> {
        self.spheres.iter().filter_map(|s| s.find_by_uid(uid)).last()
    }

    /// Cloud id of the sphere containing a Crownstone USB dongle.
    ///
    /// If multiple spheres contain a dongle, the last one is returned.
    pub fn usb_sphere_id(&self) -> Option<&str> {
        self.spheres
            .iter()
            .filter(|s| s.has_usb_dongle())
            .map(|s| s.cloud_id.as_str())
            .last()
    }

    /// Load a cloud data snapshot in json format.
    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        let snapshot: CloudSnapshot = serde_json::from_str(json)?;
        Ok(snapshot.into())
    }

    /// Load a cloud data snapshot from a json file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Serialized form of the cloud data.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CloudSnapshot {
    pub spheres: Vec<SphereSnapshot>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SphereSnapshot {
    pub cloud_id: String,
    pub name: String,
    #[serde(default)]
    pub crownstones: Vec<Device>,
}

impl From<CloudSnapshot> for CloudData {
    fn from(value: CloudSnapshot) -> Self {
        Self {
            spheres: value
                .spheres
                .into_iter()
                .map(|s| Sphere {
                    cloud_id: s.cloud_id,
                    name: s.name,
                    crownstones: s
                        .crownstones
                        .into_iter()
                        .map(|d| Arc::new(Mutex::new(d)))
                        .collect(),
                })
                .collect(),
        }
    }
}
