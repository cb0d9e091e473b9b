// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Dual-channel light controller.
//!
//! Commands are sent over the USB dongle if the Crownstone has a local channel which is ready,
//! otherwise over the Crownstone cloud. After a successful command the Crownstone state is
//! updated immediately, in case the state update from the cloud or the dongle never comes in.

use crate::channel::{CloudChannel, LocalChannel, LocalChannelState, SwitchMethod, UsbChannel};
use crate::cloud::{Device, STATE_OFF, STATE_ON, SharedDevice, lock_device};
use crate::errors::ChannelError;
use crate::light::scale::to_internal;
use log::{debug, error};
use std::sync::Arc;

/// State change notification, invoked after the controller wrote a new Crownstone state.
pub type StateListener = Arc<dyn Fn(&Device) + Send + Sync>;

/// Light command. The brightness level is in the entity scale 0..255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightAction {
    TurnOn,
    TurnOff,
    SetBrightness(u8),
}

pub struct LightController {
    device: SharedDevice,
    cloud: Arc<dyn CloudChannel>,
    local: LocalChannel,
    listener: StateListener,
}

impl LightController {
    pub fn new(
        device: SharedDevice,
        cloud: Arc<dyn CloudChannel>,
        local: LocalChannel,
        listener: StateListener,
    ) -> Self {
        Self {
            device,
            cloud,
            local,
            listener,
        }
    }

    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    pub fn local_channel(&self) -> &LocalChannel {
        &self.local
    }

    /// Channel used for the next command.
    pub fn switch_method(&self) -> SwitchMethod {
        self.local.switch_method()
    }

    pub async fn execute(&self, action: LightAction) -> Result<(), ChannelError> {
        match action {
            LightAction::TurnOn => self.turn_on().await,
            LightAction::TurnOff => self.turn_off().await,
            LightAction::SetBrightness(level) => self.set_brightness(level).await,
        }
    }

    pub async fn turn_on(&self) -> Result<(), ChannelError> {
        let device = self.snapshot();
        let result = match self.local.state() {
            LocalChannelState::Ready(usb) => {
                let uid = device.uid;
                run_blocking(usb, move |usb| usb.switch(uid, true)).await
            }
            LocalChannelState::NotReady | LocalChannelState::Absent => {
                self.cloud.turn_on(&device).await
            }
        };
        self.finish(&device, result, STATE_ON)
    }

    pub async fn turn_off(&self) -> Result<(), ChannelError> {
        let device = self.snapshot();
        let result = match self.local.state() {
            LocalChannelState::Ready(usb) => {
                let uid = device.uid;
                run_blocking(usb, move |usb| usb.switch(uid, false)).await
            }
            LocalChannelState::NotReady | LocalChannelState::Absent => {
                self.cloud.turn_off(&device).await
            }
        };
        self.finish(&device, result, STATE_OFF)
    }

    /// Set the brightness, `level` in the entity scale 0..255.
    pub async fn set_brightness(&self, level: u8) -> Result<(), ChannelError> {
        let device = self.snapshot();
        let level = to_internal(level);
        let result = match self.local.state() {
            LocalChannelState::Ready(usb) => {
                let uid = device.uid;
                run_blocking(usb, move |usb| usb.dim(uid, level)).await
            }
            LocalChannelState::NotReady | LocalChannelState::Absent => {
                self.cloud.set_brightness(&device, level).await
            }
        };
        self.finish(&device, result, level)
    }

    fn snapshot(&self) -> Device {
        lock_device(&self.device).clone()
    }

    /// Apply the optimistic state update of a sent command.
    ///
    /// A disabled ability is not an error for the caller: the command is dropped and the state is
    /// left untouched. All other errors are returned.
    fn finish(
        &self,
        device: &Device,
        result: Result<(), ChannelError>,
        state: u8,
    ) -> Result<(), ChannelError> {
        match result {
            Ok(()) => {
                self.set_state(state);
                Ok(())
            }
            Err(e @ ChannelError::AbilityNotEnabled(_)) => {
                error!("[{}] {e}", device.cloud_id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn set_state(&self, state: u8) {
        let device = {
            let mut device = lock_device(&self.device);
            device.state = state;
            device.clone()
        };
        debug!("[{}] state: {state}", device.cloud_id);
        (self.listener)(&device);
    }
}

/// Run a blocking USB dongle call on the blocking thread pool.
async fn run_blocking<F>(usb: &Arc<dyn UsbChannel>, f: F) -> Result<(), ChannelError>
where
    F: FnOnce(&dyn UsbChannel) -> Result<(), ChannelError> + Send + 'static,
{
    let usb = usb.clone();
    tokio::task::spawn_blocking(move || f(usb.as_ref()))
        .await
        .map_err(|e| ChannelError::Usb(format!("USB dongle task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::{Call, MockCloud, MockUsb};
    use crate::cloud::{Abilities, Ability, DeviceBuilder, DeviceType};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        controller: LightController,
        cloud: Arc<MockCloud>,
        usb: Option<Arc<MockUsb>>,
        notifications: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn state(&self) -> u8 {
            lock_device(self.controller.device()).state
        }

        fn usb_calls(&self) -> Vec<Call> {
            self.usb.as_ref().map(|u| u.calls()).unwrap_or_default()
        }
    }

    fn fixture(cloud: MockCloud, usb: Option<MockUsb>, state: u8) -> Fixture {
        let device = DeviceBuilder::default()
            .cloud_id("cs1")
            .uid(7u8)
            .name("Lamp")
            .state(state)
            .device_type(DeviceType::Plug)
            .abilities(Abilities::from([(Ability::Dimming, true)]))
            .build()
            .unwrap();
        let cloud = Arc::new(cloud);
        let usb = usb.map(Arc::new);
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = notifications.clone();
        let local = match &usb {
            None => LocalChannel::Absent,
            Some(usb) => LocalChannel::Present(usb.clone()),
        };
        let controller = LightController::new(
            Arc::new(Mutex::new(device)),
            cloud.clone(),
            local,
            Arc::new(move |_: &Device| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        Fixture {
            controller,
            cloud,
            usb,
            notifications,
        }
    }

    #[actix::test]
    async fn set_brightness_with_ready_dongle_uses_local_dim() {
        let f = fixture(MockCloud::default(), Some(MockUsb::ready()), 0);

        f.controller.set_brightness(128).await.unwrap();

        assert_eq!(vec![Call::Dim(7, 50)], f.usb_calls());
        assert!(f.cloud.calls().is_empty(), "cloud must not be used");
        assert_eq!(50, f.state());
        assert_eq!(1, f.notifications.load(Ordering::SeqCst));
    }

    #[actix::test]
    async fn set_brightness_without_dongle_uses_cloud() {
        let f = fixture(MockCloud::default(), None, 0);

        f.controller.set_brightness(255).await.unwrap();

        assert_eq!(
            vec![Call::SetBrightness("cs1".into(), 100)],
            f.cloud.calls()
        );
        assert_eq!(100, f.state());
    }

    #[actix::test]
    async fn turn_on_without_dongle_uses_cloud_and_sets_full_state() {
        let f = fixture(MockCloud::default(), None, 20);

        f.controller.turn_on().await.unwrap();

        assert_eq!(vec![Call::TurnOn("cs1".into())], f.cloud.calls());
        assert_eq!(100, f.state());
        assert_eq!(1, f.notifications.load(Ordering::SeqCst));
    }

    #[actix::test]
    async fn turn_on_with_ready_dongle_switches_locally() {
        let f = fixture(MockCloud::default(), Some(MockUsb::ready()), 0);

        f.controller.execute(LightAction::TurnOn).await.unwrap();

        assert_eq!(vec![Call::Switch(7, true)], f.usb_calls());
        assert!(f.cloud.calls().is_empty());
        assert_eq!(100, f.state());
    }

    #[actix::test]
    async fn turn_off_with_dongle_not_ready_uses_cloud() {
        let f = fixture(MockCloud::default(), Some(MockUsb::default()), 100);

        f.controller.turn_off().await.unwrap();

        assert!(f.usb_calls().is_empty(), "dongle must not be used");
        assert_eq!(vec![Call::TurnOff("cs1".into())], f.cloud.calls());
        assert_eq!(0, f.state());
    }

    #[actix::test]
    async fn dongle_readiness_is_checked_on_every_command() {
        let f = fixture(MockCloud::default(), Some(MockUsb::default()), 0);
        assert_eq!(SwitchMethod::Cloud, f.controller.switch_method());
        f.controller.turn_on().await.unwrap();

        f.usb.as_ref().unwrap().set_ready(true);
        assert_eq!(SwitchMethod::UsbDongle, f.controller.switch_method());
        f.controller.turn_off().await.unwrap();

        assert_eq!(vec![Call::TurnOn("cs1".into())], f.cloud.calls());
        assert_eq!(vec![Call::Switch(7, false)], f.usb_calls());
    }

    #[actix::test]
    async fn disabled_dimming_ability_leaves_state_unchanged() {
        let f = fixture(
            MockCloud::failing(ChannelError::AbilityNotEnabled(Ability::Dimming)),
            None,
            100,
        );

        let result = f.controller.set_brightness(128).await;

        assert_eq!(Ok(()), result);
        assert_eq!(100, f.state());
        assert_eq!(0, f.notifications.load(Ordering::SeqCst));
    }

    #[actix::test]
    async fn cloud_transport_error_is_propagated() {
        let f = fixture(
            MockCloud::failing(ChannelError::Cloud("connection refused".into())),
            None,
            0,
        );

        let result = f.controller.turn_on().await;

        assert_eq!(Err(ChannelError::Cloud("connection refused".into())), result);
        assert_eq!(0, f.state());
        assert_eq!(0, f.notifications.load(Ordering::SeqCst));
    }

    #[actix::test]
    async fn usb_error_is_propagated() {
        let usb = MockUsb {
            error: Some(ChannelError::Usb("write failed".into())),
            ..MockUsb::ready()
        };
        let f = fixture(MockCloud::default(), Some(usb), 100);

        let result = f.controller.turn_off().await;

        assert!(matches!(result, Err(ChannelError::Usb(_))));
        assert_eq!(100, f.state());
        assert!(f.cloud.calls().is_empty(), "no fallback to the cloud");
    }
}
