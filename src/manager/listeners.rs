// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Crownstone cloud event stream and UART event handlers.
//!
//! Events update the shared Crownstone data and notify the host if a light entity changed.

use crate::cloud::{Ability, SharedDevice, lock_device};
use crate::manager::{
    AbilityChange, AdvertisementType, CrownstoneManager, SwitchStateUpdate, UartConnectionChange,
    UartStateUpdate,
};
use actix::prelude::Handler;
use log::{debug, info, warn};
use std::str::FromStr;

impl CrownstoneManager {
    fn device_in_sphere(&self, sphere_id: &str, uid: u8) -> Option<SharedDevice> {
        let sphere = self.cloud_data.find_by_id(sphere_id)?;
        sphere.find_by_uid(uid).cloned()
    }

    /// Write a new switch state and publish it if it changed.
    fn update_switch_state(&self, device: &SharedDevice, state: u8) {
        let cloud_id = {
            let mut device = lock_device(device);
            if device.state == state {
                return;
            }
            device.state = state;
            device.cloud_id.clone()
        };
        debug!("[{cloud_id}] state update: {state}");
        self.publish_state(&cloud_id);
    }
}

impl Handler<SwitchStateUpdate> for CrownstoneManager {
    type Result = ();

    fn handle(&mut self, msg: SwitchStateUpdate, _ctx: &mut Self::Context) -> Self::Result {
        let Some(device) = self.device_in_sphere(&msg.sphere_id, msg.uid) else {
            debug!(
                "Ignoring switch state update of unknown Crownstone {} in sphere {}",
                msg.uid, msg.sphere_id
            );
            return;
        };
        self.update_switch_state(&device, msg.percentage);
    }
}

impl Handler<AbilityChange> for CrownstoneManager {
    type Result = ();

    fn handle(&mut self, msg: AbilityChange, _ctx: &mut Self::Context) -> Self::Result {
        let ability = match Ability::from_str(&msg.ability) {
            Ok(ability) => ability,
            Err(_) => {
                warn!("Ignoring change of unknown ability: {}", msg.ability);
                return;
            }
        };
        let Some(device) = self.device_in_sphere(&msg.sphere_id, msg.uid) else {
            debug!(
                "Ignoring ability change of unknown Crownstone {} in sphere {}",
                msg.uid, msg.sphere_id
            );
            return;
        };

        let cloud_id = {
            let mut device = lock_device(&device);
            if !device.abilities.set_enabled(ability, msg.enabled) {
                return;
            }
            device.cloud_id.clone()
        };
        info!(
            "[{cloud_id}] ability {ability} {}",
            if msg.enabled { "enabled" } else { "disabled" }
        );

        // dimming changes the supported features of the entity
        if ability == Ability::Dimming {
            self.publish_entity(&cloud_id);
        }
        self.publish_state(&cloud_id);
    }
}

impl Handler<UartConnectionChange> for CrownstoneManager {
    type Result = ();

    fn handle(&mut self, msg: UartConnectionChange, _ctx: &mut Self::Context) -> Self::Result {
        let Some(usb) = self.usb.as_ref() else {
            debug!("Ignoring UART connection event without configured dongle");
            return;
        };
        let changed = if msg.connected {
            usb.on_connection_established()
        } else {
            usb.on_connection_closed()
        };
        if changed {
            info!(
                "Crownstone USB dongle {}",
                if msg.connected { "connected" } else { "disconnected" }
            );
            self.publish_local_states();
        }
    }
}

impl Handler<UartStateUpdate> for CrownstoneManager {
    type Result = ();

    fn handle(&mut self, msg: UartStateUpdate, _ctx: &mut Self::Context) -> Self::Result {
        if msg.adv_type != AdvertisementType::ExternalState {
            return;
        }
        let Some(state) = msg.switch_state else {
            return;
        };
        let Some(device) = self.cloud_data.find_by_uid(msg.crownstone_id).cloned() else {
            debug!("Ignoring UART state of unknown Crownstone {}", msg.crownstone_id);
            return;
        };
        self.update_switch_state(&device, state);
    }
}
