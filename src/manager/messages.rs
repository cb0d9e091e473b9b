// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix actor message definitions used to communicate with the [`CrownstoneManager`].
//!
//! Host messages are sent from the integration API side, the event messages are emitted by the
//! Crownstone cloud event stream (SSE) and the UART driver.

#[allow(unused_imports)] // used for doc links
use crate::manager::CrownstoneManager;
use crate::configuration::UsbOptionChange;
use crate::errors::ServiceError;
use actix::prelude::{Message, Recipient};
use uc_api::intg::{AvailableIntgEntity, EntityChange, EntityCommand};

/// Entity notification for the host.
#[derive(Message)]
#[rtype(result = "()")]
pub enum HostEvent {
    /// Entity state or attributes changed.
    EntityChange(EntityChange),
    /// Entity definition changed, e.g. supported features. The host must refresh the entity.
    EntityUpdate(AvailableIntgEntity),
}

/// Subscribe to [`HostEvent`] notifications.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe(pub Recipient<HostEvent>);

/// Request all light entities.
#[derive(Message)]
#[rtype(result = "Vec<AvailableIntgEntity>")]
pub struct GetAvailableEntities;

/// Request the current state of all light entities.
#[derive(Message)]
#[rtype(result = "Vec<EntityChange>")]
pub struct GetEntityStates;

/// Execute a light entity command.
#[derive(Message)]
#[rtype(result = "Result<(), ServiceError>")]
pub struct EntityCommandMsg(pub EntityCommand);

/// Internal notification of a light controller: the Crownstone state was written.
#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct StateChanged {
    pub cloud_id: String,
}

/// Cloud event: a Crownstone was switched, e.g. from the Crownstone app.
#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct SwitchStateUpdate {
    pub sphere_id: String,
    pub uid: u8,
    /// Switch state 0..100
    pub percentage: u8,
}

/// Cloud event: an ability of a Crownstone was enabled or disabled.
#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct AbilityChange {
    pub sphere_id: String,
    pub uid: u8,
    /// Ability type as reported by the cloud, e.g. `dimming`.
    pub ability: String,
    pub enabled: bool,
}

/// UART system event: the dongle connection was established or closed.
#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct UartConnectionChange {
    pub connected: bool,
}

/// Advertisement type of a Crownstone state packet received over the dongle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisementType {
    /// State of the Crownstone the dongle is connected to.
    State,
    /// State of another Crownstone, relayed through the mesh.
    ExternalState,
    Error,
}

/// UART event: a Crownstone state was received.
#[derive(Debug, Message)]
#[rtype(result = "()")]
pub struct UartStateUpdate {
    pub adv_type: AdvertisementType,
    pub crownstone_id: u8,
    /// Switch state 0..100, not available in all packets.
    pub switch_state: Option<u8>,
}

/// Options flow: enable or disable the Crownstone USB dongle.
///
/// Disabling removes the configured dongle, persists the change and recreates all entities
/// without local channel. Enabling without configured dongle requires the USB setup flow.
#[derive(Debug, Message)]
#[rtype(result = "Result<UsbOptionChange, ServiceError>")]
pub struct SetUseUsb {
    pub use_usb: bool,
}

/// Stop all services and remove all entities.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Unload;
