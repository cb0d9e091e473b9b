// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Light entity setup and USB dongle resolution.

use crate::channel::{CloudChannel, LocalChannel, UsbChannel};
use crate::cloud::{CloudData, lock_device};
use crate::configuration::UsbSettings;
use crate::light::{CrownstoneLight, LightController, StateListener};
use crate::usb::{UartDriver, UsbDongle};
use crate::util::serial::get_port;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Create a light entity for every switchable Crownstone.
///
/// The USB dongle can only reach the Crownstones in its own sphere: Crownstones in other spheres
/// are always switched with the cloud.
///
/// returns: light entities by Crownstone cloud id
pub fn create_lights(
    cloud_data: &CloudData,
    cloud: &Arc<dyn CloudChannel>,
    usb: Option<Arc<dyn UsbChannel>>,
    listener: StateListener,
) -> HashMap<String, CrownstoneLight> {
    let usb_sphere_id = cloud_data.usb_sphere_id();
    if usb.is_some() && usb_sphere_id.is_none() {
        warn!("Crownstone USB dongle is configured but not registered in any sphere");
    }

    let mut lights = HashMap::new();
    for sphere in &cloud_data.spheres {
        let local = match (&usb, usb_sphere_id) {
            (Some(usb), Some(id)) if id == sphere.cloud_id => LocalChannel::Present(usb.clone()),
            _ => LocalChannel::Absent,
        };
        for device in &sphere.crownstones {
            let (cloud_id, device_type) = {
                let device = lock_device(device);
                (device.cloud_id.clone(), device.device_type)
            };
            if !device_type.is_switchable() {
                debug!("[{cloud_id}] Skipping Crownstone of type {device_type}");
                continue;
            }
            let controller = LightController::new(
                device.clone(),
                cloud.clone(),
                local.clone(),
                listener.clone(),
            );
            lights.insert(
                cloud_id,
                CrownstoneLight::new(controller, Some(sphere.name.clone())),
            );
        }
    }
    lights
}

/// Create the USB dongle from the configuration.
///
/// The dongle is only created if the configured `/dev/serial/by-id` link resolves to a port. The
/// link is missing if the dongle is not plugged in, this is not an error: the cloud is used
/// instead.
pub fn usb_dongle(
    settings: &UsbSettings,
    disabled: bool,
    driver: Arc<dyn UartDriver>,
) -> Option<Arc<UsbDongle>> {
    if disabled {
        info!("Crownstone USB dongle disabled");
        return None;
    }
    let path = settings.path.as_deref()?;
    match get_port(path) {
        Some(port) => {
            let port = format!("/dev/{port}");
            info!("Using Crownstone USB dongle {path} on {port}");
            Some(Arc::new(UsbDongle::new(port, settings.init_timeout, driver)))
        }
        None => {
            warn!("Crownstone USB dongle {path} not found, using cloud only");
            None
        }
    }
}
