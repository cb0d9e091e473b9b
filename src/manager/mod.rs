// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Crownstone entry manager: owns the cloud data, the USB dongle and the light entities.
//!
//! The manager is the single coordinating context of the integration. Host commands, cloud events
//! and UART events are all handled as actor messages.

mod handler;
mod listeners;
mod messages;
mod setup;

pub use messages::*;
pub use setup::*;

use crate::channel::{CloudChannel, LocalChannel, UsbChannel};
use crate::cloud::{CloudData, Device};
use crate::configuration::{UsbSettings, user_settings_path};
use crate::light::{CrownstoneLight, StateListener};
use crate::usb::UsbDongle;
use actix::prelude::{
    Actor, ActorFutureExt, AsyncContext, Context, Recipient, WrapFuture,
};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub struct CrownstoneManager {
    cloud_data: CloudData,
    cloud: Arc<dyn CloudChannel>,
    /// Configured USB dongle, if the by-id link resolved to a serial port
    usb: Option<Arc<UsbDongle>>,
    usb_settings: UsbSettings,
    /// User settings file for persisting USB option changes
    settings_file: PathBuf,
    /// Light entities by Crownstone cloud id
    lights: HashMap<String, CrownstoneLight>,
    subscribers: Vec<Recipient<HostEvent>>,
}

impl CrownstoneManager {
    pub fn new(
        cloud_data: CloudData,
        cloud: Arc<dyn CloudChannel>,
        usb: Option<Arc<UsbDongle>>,
        usb_settings: UsbSettings,
    ) -> Self {
        Self {
            cloud_data,
            cloud,
            usb,
            usb_settings,
            settings_file: user_settings_path(),
            lights: Default::default(),
            subscribers: Default::default(),
        }
    }

    /// Use a different user settings file than the default [`user_settings_path`].
    pub fn with_settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = path.into();
        self
    }

    fn state_listener(ctx: &Context<Self>) -> StateListener {
        let addr = ctx.address();
        Arc::new(move |device: &Device| {
            addr.do_send(StateChanged {
                cloud_id: device.cloud_id.clone(),
            })
        })
    }

    fn create_entities(&mut self, ctx: &Context<Self>) {
        let usb = self
            .usb
            .as_ref()
            .map(|usb| usb.clone() as Arc<dyn UsbChannel>);
        self.lights = create_lights(
            &self.cloud_data,
            &self.cloud,
            usb,
            Self::state_listener(ctx),
        );
        info!("Created {} Crownstone light entities", self.lights.len());
    }

    /// Initialize the USB dongle in the background. All lights depend on the readiness state.
    fn initialize_usb(&self, ctx: &mut Context<Self>) {
        let Some(usb) = self.usb.clone() else {
            return;
        };
        if usb.is_ready() {
            return;
        }
        ctx.spawn(
            async move {
                tokio::task::spawn_blocking(move || usb.initialize())
                    .await
                    .map_err(|e| e.to_string())
                    .and_then(|r| r.map_err(|e| e.to_string()))
            }
            .into_actor(self)
            .map(|result, act, _ctx| match result {
                Ok(()) => {
                    info!("Crownstone USB dongle ready");
                    act.publish_local_states();
                }
                Err(e) => warn!("Crownstone USB dongle not available, using cloud: {e}"),
            }),
        );
    }

    /// Notify all subscribers about the current state of a light.
    fn publish_state(&self, cloud_id: &str) {
        let Some(light) = self.lights.get(cloud_id) else {
            debug!("[{cloud_id}] State change of unknown light");
            return;
        };
        for subscriber in &self.subscribers {
            subscriber.do_send(HostEvent::EntityChange(light.to_entity_change()));
        }
    }

    fn publish_all_states(&self) {
        for cloud_id in self.lights.keys() {
            self.publish_state(cloud_id);
        }
    }

    /// Publish the lights which can be switched with the USB dongle. Only their switch method
    /// depends on the dongle state.
    fn publish_local_states(&self) {
        for (cloud_id, light) in &self.lights {
            if matches!(light.controller().local_channel(), LocalChannel::Present(_)) {
                self.publish_state(cloud_id);
            }
        }
    }

    /// Notify all subscribers about a changed entity definition.
    fn publish_entity(&self, cloud_id: &str) {
        if let Some(light) = self.lights.get(cloud_id) {
            for subscriber in &self.subscribers {
                subscriber.do_send(HostEvent::EntityUpdate(light.to_available_entity()));
            }
        }
    }

    fn light_by_entity_id(&self, entity_id: &str) -> Option<&CrownstoneLight> {
        self.lights.values().find(|l| l.entity_id() == entity_id)
    }
}

impl Actor for CrownstoneManager {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.create_entities(ctx);
        self.initialize_usb(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(usb) = self.usb.as_ref() {
            usb.stop();
        }
    }
}
