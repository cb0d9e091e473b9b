// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Light entity specific logic: Crownstone metadata and state mapping to integration API entities.

use crate::cloud::{Ability, lock_device};
use crate::light::LightController;
use crate::light::scale::to_external;
use crate::startup::{DOMAIN, MANUFACTURER};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use uc_api::intg::{AvailableIntgEntity, EntityChange};
use uc_api::{EntityType, LightFeature};

/// Unique id suffix of Crownstone light entities.
pub const ENTITY_SUFFIX: &str = "crownstone";

pub const ICON: &str = "mdi:power-socket-de";

/// Device registry information of a Crownstone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub model: Option<String>,
    pub sw_version: Option<String>,
}

/// A Crownstone exposed as light entity.
pub struct CrownstoneLight {
    controller: Arc<LightController>,
    /// Name of the sphere the Crownstone belongs to
    area: Option<String>,
}

impl CrownstoneLight {
    pub fn new(controller: LightController, area: Option<String>) -> Self {
        Self {
            controller: Arc::new(controller),
            area,
        }
    }

    pub fn controller(&self) -> &Arc<LightController> {
        &self.controller
    }

    /// Cloud id of the Crownstone, used as device id.
    pub fn cloud_id(&self) -> String {
        lock_device(self.controller.device()).cloud_id.clone()
    }

    /// Unique entity id.
    pub fn entity_id(&self) -> String {
        format!("{}-{ENTITY_SUFFIX}", self.cloud_id())
    }

    pub fn name(&self) -> String {
        lock_device(self.controller.device()).name.clone()
    }

    pub fn icon(&self) -> &'static str {
        ICON
    }

    /// Brightness in the entity scale 0..255.
    pub fn brightness(&self) -> u8 {
        to_external(lock_device(self.controller.device()).state)
    }

    pub fn is_on(&self) -> bool {
        self.brightness() > 0
    }

    /// Supported light features. Dimming is only supported if the dimming ability is enabled.
    pub fn supported_features(&self) -> Vec<LightFeature> {
        let mut features = Vec::with_capacity(2);
        // OnOff is default
        features.push(LightFeature::Toggle);
        if lock_device(self.controller.device())
            .abilities
            .is_enabled(Ability::Dimming)
        {
            features.push(LightFeature::Dim);
        }
        features
    }

    pub fn device_info(&self) -> DeviceInfo {
        let device = lock_device(self.controller.device());
        DeviceInfo {
            identifiers: vec![(DOMAIN.into(), device.cloud_id.clone())],
            name: device.name.clone(),
            manufacturer: MANUFACTURER.into(),
            model: device.device_type.model_label().map(|v| v.to_string()),
            sw_version: device.sw_version.clone(),
        }
    }

    /// Entity attributes: light state, brightness, switch method and Crownstone abilities.
    pub fn state_attributes(&self) -> Map<String, Value> {
        let brightness = self.brightness();
        let switch_method = self.controller.switch_method();
        let device = lock_device(self.controller.device());

        let mut attributes = Map::with_capacity(6);
        attributes.insert(
            "state".into(),
            Value::String(if brightness > 0 { "ON" } else { "OFF" }.into()),
        );
        attributes.insert("brightness".into(), Value::Number(brightness.into()));
        attributes.insert(
            "switch_method".into(),
            Value::String(switch_method.to_string()),
        );
        for (key, ability) in [
            ("dimming", Ability::Dimming),
            ("tap_to_toggle", Ability::TapToToggle),
            ("switchcraft", Ability::Switchcraft),
        ] {
            attributes.insert(
                key.into(),
                Value::String(device.abilities.state(ability).to_string()),
            );
        }
        attributes
    }

    /// Registration options: entity icon and device registry information.
    pub fn entity_options(&self) -> Map<String, Value> {
        let mut options = Map::with_capacity(2);
        options.insert("icon".into(), Value::String(self.icon().into()));
        options.insert("device_info".into(), json!(self.device_info()));
        options
    }

    pub fn to_available_entity(&self) -> AvailableIntgEntity {
        AvailableIntgEntity {
            entity_id: self.entity_id(),
            device_id: Some(self.cloud_id()),
            entity_type: EntityType::Light,
            device_class: None,
            name: HashMap::from([("en".into(), self.name())]),
            features: Some(
                self.supported_features()
                    .into_iter()
                    .map(|v| v.to_string())
                    .collect(),
            ),
            area: self.area.clone(),
            options: Some(self.entity_options()),
            attributes: Some(self.state_attributes()),
        }
    }

    pub fn to_entity_change(&self) -> EntityChange {
        EntityChange {
            device_id: Some(self.cloud_id()),
            entity_type: EntityType::Light,
            entity_id: self.entity_id(),
            attributes: self.state_attributes(),
        }
    }
}
