// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Translates integration API light entity commands into light controller actions.

use crate::errors::ServiceError;
use crate::light::LightAction;
use crate::light::scale::BRIGHTNESS_MAX;
use uc_api::LightCommand;
use uc_api::intg::EntityCommand;

/// Map a light entity command to a [`LightAction`].
///
/// # Arguments
///
/// * `msg`: entity command with optional `brightness` parameter (0..255) for the `on` command.
/// * `is_on`: current light state, required to resolve the `toggle` command.
///
/// returns: the light action or a BadRequest error for invalid commands or parameters.
pub fn light_action(msg: &EntityCommand, is_on: bool) -> Result<LightAction, ServiceError> {
    let cmd: LightCommand = cmd_from_str(&msg.cmd_id)?;

    #[allow(unreachable_patterns)]
    let action = match cmd {
        LightCommand::On => match msg.params.as_ref().and_then(|p| p.get("brightness")) {
            None => LightAction::TurnOn,
            Some(value) => match value.as_u64() {
                Some(brightness @ 0..=255) => LightAction::SetBrightness(brightness as u8),
                _ => {
                    return Err(ServiceError::BadRequest(format!(
                        "Invalid brightness value {value}: Valid: 0..{BRIGHTNESS_MAX}"
                    )));
                }
            },
        },
        LightCommand::Off => LightAction::TurnOff,
        LightCommand::Toggle if is_on => LightAction::TurnOff,
        LightCommand::Toggle => LightAction::TurnOn,
        _ => {
            return Err(ServiceError::BadRequest(format!(
                "Unsupported light command: {}",
                msg.cmd_id
            )));
        }
    };

    Ok(action)
}

pub fn cmd_from_str<T: std::str::FromStr + strum::VariantNames>(
    cmd: &str,
) -> Result<T, ServiceError> {
    T::from_str(cmd).map_err(|_| {
        ServiceError::BadRequest(format!(
            "Invalid cmd_id: {cmd}. Valid commands: {}",
            T::VARIANTS.to_vec().join(",")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};
    use uc_api::EntityType;

    fn new_entity_command(cmd_id: impl Into<String>, params: Value) -> EntityCommand {
        EntityCommand {
            device_id: None,
            entity_type: EntityType::Light,
            entity_id: "5f2b-crownstone".into(),
            cmd_id: cmd_id.into(),
            params: params.as_object().cloned(),
        }
    }

    #[rstest]
    #[case("on", json!(null), false, LightAction::TurnOn)]
    #[case("on", json!({}), true, LightAction::TurnOn)]
    #[case("on", json!({"brightness": 128}), false, LightAction::SetBrightness(128))]
    #[case("on", json!({"brightness": 0}), true, LightAction::SetBrightness(0))]
    #[case("off", json!(null), true, LightAction::TurnOff)]
    #[case("toggle", json!(null), true, LightAction::TurnOff)]
    #[case("toggle", json!(null), false, LightAction::TurnOn)]
    fn light_action_from_command(
        #[case] cmd_id: &str,
        #[case] params: Value,
        #[case] is_on: bool,
        #[case] expected: LightAction,
    ) {
        let cmd = new_entity_command(cmd_id, params);
        assert_eq!(Ok(expected), light_action(&cmd, is_on));
    }

    #[rstest]
    #[case(json!({"brightness": 256}))]
    #[case(json!({"brightness": -1}))]
    #[case(json!({"brightness": "full"}))]
    fn light_action_with_invalid_brightness_returns_err(#[case] params: Value) {
        let cmd = new_entity_command("on", params);
        let result = light_action(&cmd, false);
        assert!(
            matches!(result, Err(ServiceError::BadRequest(_))),
            "Invalid brightness must return BadRequest, but got: {:?}",
            result
        );
    }

    #[test]
    fn light_action_with_invalid_command_returns_err() {
        let cmd = new_entity_command("dance", json!(null));
        assert!(matches!(
            light_action(&cmd, false),
            Err(ServiceError::BadRequest(_))
        ));
    }
}
