// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Recording channel mocks for unit tests.

use crate::channel::{CloudChannel, UsbChannel};
use crate::cloud::Device;
use crate::errors::ChannelError;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    TurnOn(String),
    TurnOff(String),
    SetBrightness(String, u8),
    Switch(u8, bool),
    Dim(u8, u8),
}

#[derive(Default)]
pub struct MockCloud {
    pub calls: Mutex<Vec<Call>>,
    pub error: Mutex<Option<ChannelError>>,
}

impl MockCloud {
    pub fn failing(error: ChannelError) -> Self {
        Self {
            calls: Default::default(),
            error: Mutex::new(Some(error)),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ChannelError> {
        self.calls.lock().unwrap().push(call);
        match self.error.lock().unwrap().clone() {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

#[async_trait]
impl CloudChannel for MockCloud {
    async fn turn_on(&self, device: &Device) -> Result<(), ChannelError> {
        self.record(Call::TurnOn(device.cloud_id.clone()))
    }

    async fn turn_off(&self, device: &Device) -> Result<(), ChannelError> {
        self.record(Call::TurnOff(device.cloud_id.clone()))
    }

    async fn set_brightness(&self, device: &Device, level: u8) -> Result<(), ChannelError> {
        self.record(Call::SetBrightness(device.cloud_id.clone(), level))
    }
}

#[derive(Default)]
pub struct MockUsb {
    pub ready: AtomicBool,
    pub calls: Mutex<Vec<Call>>,
    pub error: Option<ChannelError>,
}

impl MockUsb {
    pub fn ready() -> Self {
        Self {
            ready: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ChannelError> {
        self.calls.lock().unwrap().push(call);
        match &self.error {
            None => Ok(()),
            Some(e) => Err(e.clone()),
        }
    }
}

impl UsbChannel for MockUsb {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn switch(&self, uid: u8, on: bool) -> Result<(), ChannelError> {
        self.record(Call::Switch(uid, on))
    }

    fn dim(&self, uid: u8, level: u8) -> Result<(), ChannelError> {
        self.record(Call::Dim(uid, level))
    }
}
