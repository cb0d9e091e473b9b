// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Custom application errors with conversions from common Rust and 3rd-party errors.

use crate::cloud::Ability;
use actix::MailboxError;
use derive_more::Display;
use log::error;

#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display("Internal server error: {_0}")]
    InternalServerError(String),

    #[display("Internal serialization error: {_0}")]
    SerializationError(String),

    #[display("BadRequest: {_0}")]
    BadRequest(String),

    #[display("Not found: {_0}")]
    NotFound(String),

    #[display("The connection is closed or closing")]
    NotConnected,

    #[display("Service unavailable: {_0}")]
    ServiceUnavailable(String),
}

impl std::error::Error for ServiceError {}

/// Errors returned by the Crownstone control channels.
///
/// Only [`ChannelError::AbilityNotEnabled`] is recovered by the light controller, all other errors
/// are propagated to the caller.
#[derive(Clone, Debug, Display, PartialEq)]
pub enum ChannelError {
    /// The command requires an ability which is disabled on the Crownstone.
    #[display("Ability {_0} is not enabled")]
    AbilityNotEnabled(Ability),

    /// Crownstone cloud request failed.
    #[display("Cloud error: {_0}")]
    Cloud(String),

    /// Crownstone USB dongle communication failed.
    #[display("USB error: {_0}")]
    Usb(String),
}

impl std::error::Error for ChannelError {}

impl From<ChannelError> for ServiceError {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::AbilityNotEnabled(_) => ServiceError::BadRequest(e.to_string()),
            ChannelError::Cloud(_) | ChannelError::Usb(_) => {
                ServiceError::ServiceUnavailable(e.to_string())
            }
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::InternalServerError(format!("{:?}", e))
    }
}

impl From<MailboxError> for ServiceError {
    fn from(e: MailboxError) -> Self {
        ServiceError::InternalServerError(format!("Internal message error: {:?}", e))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        error!("{:?}", e);
        ServiceError::SerializationError(e.to_string())
    }
}

impl From<strum::ParseError> for ServiceError {
    fn from(e: strum::ParseError) -> Self {
        ServiceError::SerializationError(e.to_string())
    }
}
