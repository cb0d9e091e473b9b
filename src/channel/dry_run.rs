// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Logging channel implementations for running the driver without cloud account or dongle.

use crate::channel::CloudChannel;
use crate::cloud::{Ability, Device};
use crate::errors::ChannelError;
use crate::usb::UartDriver;
use async_trait::async_trait;
use log::info;
use std::time::Duration;

/// Cloud channel only logging the requests.
///
/// Mirrors the cloud's ability check: brightness requests for Crownstones without the dimming
/// ability are rejected.
#[derive(Debug, Default)]
pub struct DryRunCloud;

#[async_trait]
impl CloudChannel for DryRunCloud {
    async fn turn_on(&self, device: &Device) -> Result<(), ChannelError> {
        info!("[{}] cloud: turn on '{}'", device.cloud_id, device.name);
        Ok(())
    }

    async fn turn_off(&self, device: &Device) -> Result<(), ChannelError> {
        info!("[{}] cloud: turn off '{}'", device.cloud_id, device.name);
        Ok(())
    }

    async fn set_brightness(&self, device: &Device, level: u8) -> Result<(), ChannelError> {
        if !device.abilities.is_enabled(Ability::Dimming) {
            return Err(ChannelError::AbilityNotEnabled(Ability::Dimming));
        }
        info!(
            "[{}] cloud: set brightness of '{}' to {level}%",
            device.cloud_id, device.name
        );
        Ok(())
    }
}

/// UART driver only logging the requests.
#[derive(Debug, Default)]
pub struct DryRunUart;

impl UartDriver for DryRunUart {
    fn initialize(&self, port: &str, timeout: Duration) -> Result<(), ChannelError> {
        info!("uart: initialize {port} (timeout: {}ms)", timeout.as_millis());
        Ok(())
    }

    fn switch_crownstone(&self, uid: u8, on: bool) -> Result<(), ChannelError> {
        info!("uart: switch crownstone {uid} {}", if on { "on" } else { "off" });
        Ok(())
    }

    fn dim_crownstone(&self, uid: u8, level: u8) -> Result<(), ChannelError> {
        info!("uart: dim crownstone {uid} to {level}%");
        Ok(())
    }

    fn stop(&self) {
        info!("uart: stop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{DeviceBuilder, DeviceType};

    #[actix::test]
    async fn dry_run_cloud_rejects_brightness_without_dimming() {
        let device = DeviceBuilder::default()
            .cloud_id("cs1")
            .uid(1u8)
            .name("Lamp")
            .device_type(DeviceType::Plug)
            .build()
            .unwrap();
        let result = DryRunCloud.set_brightness(&device, 50).await;
        assert_eq!(Err(ChannelError::AbilityNotEnabled(Ability::Dimming)), result);
        assert_eq!(Ok(()), DryRunCloud.turn_on(&device).await);
    }
}
