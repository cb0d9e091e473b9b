// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Crownstone control channels.
//!
//! A Crownstone can either be switched with the Crownstone cloud, or directly with a Crownstone
//! USB dongle if the dongle is in the same sphere. The channel implementations are provided by
//! client libraries, this module only defines the interfaces the light controller depends on.

mod dry_run;
#[cfg(test)]
pub(crate) mod mock;

pub use dry_run::*;

use crate::cloud::Device;
use crate::errors::ChannelError;
use async_trait::async_trait;
use std::sync::Arc;
use strum::{AsRefStr, Display};

/// Crownstone cloud control interface.
///
/// Brightness levels are in the Crownstone scale 0..100.
#[async_trait]
pub trait CloudChannel: Send + Sync {
    async fn turn_on(&self, device: &Device) -> Result<(), ChannelError>;

    async fn turn_off(&self, device: &Device) -> Result<(), ChannelError>;

    /// Set the brightness of a dimmable Crownstone.
    ///
    /// Returns [`ChannelError::AbilityNotEnabled`] if dimming is not enabled on the Crownstone.
    async fn set_brightness(&self, device: &Device, level: u8) -> Result<(), ChannelError>;
}

/// Crownstone USB dongle control interface.
///
/// All operations are synchronous and may block on serial I/O. They must not be called from the
/// actor context directly.
pub trait UsbChannel: Send + Sync {
    /// Dongle is plugged in and initialized.
    fn is_ready(&self) -> bool;

    fn switch(&self, uid: u8, on: bool) -> Result<(), ChannelError>;

    /// Dim a Crownstone, `level` in the Crownstone scale 0..100.
    fn dim(&self, uid: u8, level: u8) -> Result<(), ChannelError>;
}

/// Local USB dongle channel of a Crownstone.
///
/// A dongle only reaches the Crownstones of its own sphere: all other Crownstones are `Absent`.
#[derive(Clone, Default)]
pub enum LocalChannel {
    #[default]
    Absent,
    Present(Arc<dyn UsbChannel>),
}

/// Runtime state of a [`LocalChannel`].
pub enum LocalChannelState<'a> {
    Ready(&'a Arc<dyn UsbChannel>),
    NotReady,
    Absent,
}

impl LocalChannel {
    pub fn state(&self) -> LocalChannelState<'_> {
        match self {
            LocalChannel::Absent => LocalChannelState::Absent,
            LocalChannel::Present(usb) if usb.is_ready() => LocalChannelState::Ready(usb),
            LocalChannel::Present(_) => LocalChannelState::NotReady,
        }
    }

    /// Active switch method based on the current dongle state.
    pub fn switch_method(&self) -> SwitchMethod {
        match self.state() {
            LocalChannelState::Ready(_) => SwitchMethod::UsbDongle,
            LocalChannelState::NotReady | LocalChannelState::Absent => SwitchMethod::Cloud,
        }
    }
}

impl From<Option<Arc<dyn UsbChannel>>> for LocalChannel {
    fn from(value: Option<Arc<dyn UsbChannel>>) -> Self {
        match value {
            None => LocalChannel::Absent,
            Some(usb) => LocalChannel::Present(usb),
        }
    }
}

/// Channel used to switch a Crownstone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
pub enum SwitchMethod {
    #[strum(serialize = "Crownstone USB Dongle")]
    UsbDongle,
    #[strum(serialize = "Crownstone Cloud")]
    Cloud,
}
