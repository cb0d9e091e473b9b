// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Crownstone USB dongle connection handling.
//!
//! The UART driver is an external library. [`UsbDongle`] tracks the connection state reported
//! by the driver's system events and exposes the dongle as [`UsbChannel`].

use crate::channel::UsbChannel;
use crate::errors::ChannelError;
use log::{debug, info, warn};
use rust_fsm::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Crownstone UART driver interface.
///
/// All calls are blocking.
pub trait UartDriver: Send + Sync {
    /// Open the serial port and wait until the dongle is initialized, at most for `timeout`.
    fn initialize(&self, port: &str, timeout: Duration) -> Result<(), ChannelError>;

    fn switch_crownstone(&self, uid: u8, on: bool) -> Result<(), ChannelError>;

    fn dim_crownstone(&self, uid: u8, level: u8) -> Result<(), ChannelError>;

    /// Close the serial port.
    fn stop(&self);
}

state_machine! {
    derive(Debug)
    DongleMode(Configured)

    Configured => {
        Initialize => Initializing,
        Stop => Stopped,
    },
    Initializing => {
        ConnectionEstablished => Connected,
        ConnectionClosed => Disconnected,
        Stop => Stopped,
    },
    Connected => {
        ConnectionClosed => Disconnected,
        Stop => Stopped,
    },
    Disconnected => {
        ConnectionEstablished => Connected,
        Stop => Stopped,
    },
}

/// A configured Crownstone USB dongle.
pub struct UsbDongle {
    port: String,
    init_timeout: Duration,
    driver: Arc<dyn UartDriver>,
    machine: Mutex<StateMachine<DongleMode>>,
}

impl UsbDongle {
    /// Create a new dongle instance for the given serial port, e.g. `/dev/ttyUSB0`.
    ///
    /// The dongle is not ready until [`UsbDongle::initialize`] succeeded.
    pub fn new(
        port: impl Into<String>,
        init_timeout: Duration,
        driver: Arc<dyn UartDriver>,
    ) -> Self {
        Self {
            port: port.into(),
            init_timeout,
            driver,
            machine: Mutex::new(StateMachine::new()),
        }
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    fn machine(&self) -> MutexGuard<'_, StateMachine<DongleMode>> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn consume(&self, input: DongleModeInput) -> bool {
        let mut machine = self.machine();
        match machine.consume(&input) {
            Ok(_) => {
                debug!("[{}] USB dongle state: {:?}", self.port, machine.state());
                true
            }
            Err(_) => {
                debug!(
                    "[{}] Ignoring USB dongle input {:?} in state {:?}",
                    self.port,
                    input,
                    machine.state()
                );
                false
            }
        }
    }

    /// Initialize the dongle connection. Blocks until the driver finished the initialization.
    pub fn initialize(&self) -> Result<(), ChannelError> {
        if !self.consume(DongleModeInput::Initialize) {
            return Err(ChannelError::Usb(format!(
                "Dongle on {} cannot be initialized in its current state",
                self.port
            )));
        }
        info!("[{}] Initializing Crownstone USB dongle", self.port);
        match self.driver.initialize(&self.port, self.init_timeout) {
            Ok(()) => {
                self.on_connection_established();
                Ok(())
            }
            Err(e) => {
                warn!("[{}] USB dongle initialization failed: {e}", self.port);
                self.on_connection_closed();
                Err(e)
            }
        }
    }

    /// UART connection established system event.
    ///
    /// Returns true if the dongle state changed.
    pub fn on_connection_established(&self) -> bool {
        self.consume(DongleModeInput::ConnectionEstablished)
    }

    /// UART connection closed system event.
    ///
    /// Returns true if the dongle state changed.
    pub fn on_connection_closed(&self) -> bool {
        self.consume(DongleModeInput::ConnectionClosed)
    }

    /// Stop the UART driver. The dongle cannot be used afterwards.
    pub fn stop(&self) {
        if self.consume(DongleModeInput::Stop) {
            info!("[{}] Stopping Crownstone USB dongle", self.port);
            self.driver.stop();
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.machine().state(), &DongleModeState::Stopped)
    }
}

impl UsbChannel for UsbDongle {
    fn is_ready(&self) -> bool {
        matches!(self.machine().state(), &DongleModeState::Connected)
    }

    fn switch(&self, uid: u8, on: bool) -> Result<(), ChannelError> {
        if !self.is_ready() {
            return Err(ChannelError::Usb(format!(
                "Dongle on {} is not connected",
                self.port
            )));
        }
        self.driver.switch_crownstone(uid, on)
    }

    fn dim(&self, uid: u8, level: u8) -> Result<(), ChannelError> {
        if !self.is_ready() {
            return Err(ChannelError::Usb(format!(
                "Dongle on {} is not connected",
                self.port
            )));
        }
        self.driver.dim_crownstone(uid, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[derive(Default)]
    struct Driver {
        fail_init: bool,
        switched: Mutex<Vec<(u8, bool)>>,
        stopped: AtomicUsize,
        initialized: AtomicBool,
    }

    impl UartDriver for Driver {
        fn initialize(&self, _port: &str, _timeout: Duration) -> Result<(), ChannelError> {
            if self.fail_init {
                return Err(ChannelError::Usb("no such device".into()));
            }
            self.initialized.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn switch_crownstone(&self, uid: u8, on: bool) -> Result<(), ChannelError> {
            self.switched.lock().unwrap().push((uid, on));
            Ok(())
        }

        fn dim_crownstone(&self, _uid: u8, _level: u8) -> Result<(), ChannelError> {
            Ok(())
        }

        fn stop(&self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn dongle_is_ready_after_initialization() {
        let driver = Arc::new(Driver::default());
        let dongle = UsbDongle::new("/dev/ttyUSB0", TIMEOUT, driver.clone());
        assert!(!dongle.is_ready());

        dongle.initialize().unwrap();
        assert!(dongle.is_ready());
        assert!(driver.initialized.load(Ordering::SeqCst));

        dongle.switch(4, true).unwrap();
        assert_eq!(vec![(4, true)], *driver.switched.lock().unwrap());
    }

    #[test]
    fn failed_initialization_returns_error_and_not_ready() {
        let driver = Arc::new(Driver {
            fail_init: true,
            ..Default::default()
        });
        let dongle = UsbDongle::new("/dev/ttyUSB0", TIMEOUT, driver);
        assert!(dongle.initialize().is_err());
        assert!(!dongle.is_ready());
        // the dongle may still connect later
        assert!(dongle.on_connection_established());
        assert!(dongle.is_ready());
    }

    #[test]
    fn connection_events_toggle_readiness() {
        let dongle = UsbDongle::new("/dev/ttyUSB0", TIMEOUT, Arc::new(Driver::default()));
        dongle.initialize().unwrap();
        assert!(dongle.on_connection_closed());
        assert!(!dongle.is_ready());
        assert!(!dongle.on_connection_closed(), "no change expected");
        assert!(matches!(
            dongle.switch(1, false),
            Err(ChannelError::Usb(_))
        ));
        assert!(dongle.on_connection_established());
        assert!(dongle.is_ready());
    }

    #[test]
    fn stop_is_final() {
        let driver = Arc::new(Driver::default());
        let dongle = UsbDongle::new("/dev/ttyUSB0", TIMEOUT, driver.clone());
        dongle.initialize().unwrap();
        dongle.stop();
        dongle.stop();
        assert!(dongle.is_stopped());
        assert!(!dongle.is_ready());
        assert!(!dongle.on_connection_established());
        assert_eq!(1, driver.stopped.load(Ordering::SeqCst));
    }
}
