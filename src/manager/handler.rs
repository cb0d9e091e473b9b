// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handlers for integration API host requests.

use crate::configuration::{UsbOptionChange, save_user_settings};
use crate::errors::ServiceError;
use crate::light::light_action;
use crate::manager::{
    CrownstoneManager, EntityCommandMsg, GetAvailableEntities, GetEntityStates, SetUseUsb,
    StateChanged, Subscribe, Unload,
};
use actix::prelude::{ActorContext, Handler, ResponseFuture};
use log::{debug, info};
use uc_api::EntityType;
use uc_api::intg::{AvailableIntgEntity, EntityChange};

impl Handler<Subscribe> for CrownstoneManager {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _ctx: &mut Self::Context) -> Self::Result {
        self.subscribers.push(msg.0);
    }
}

impl Handler<GetAvailableEntities> for CrownstoneManager {
    type Result = Vec<AvailableIntgEntity>;

    fn handle(&mut self, _: GetAvailableEntities, _ctx: &mut Self::Context) -> Self::Result {
        self.lights
            .values()
            .map(|light| light.to_available_entity())
            .collect()
    }
}

impl Handler<GetEntityStates> for CrownstoneManager {
    type Result = Vec<EntityChange>;

    fn handle(&mut self, _: GetEntityStates, _ctx: &mut Self::Context) -> Self::Result {
        self.lights
            .values()
            .map(|light| light.to_entity_change())
            .collect()
    }
}

impl Handler<EntityCommandMsg> for CrownstoneManager {
    type Result = ResponseFuture<Result<(), ServiceError>>;

    fn handle(&mut self, msg: EntityCommandMsg, _ctx: &mut Self::Context) -> Self::Result {
        let cmd = msg.0;
        if !matches!(cmd.entity_type, EntityType::Light) {
            return Box::pin(std::future::ready(Err(ServiceError::BadRequest(format!(
                "Unsupported entity type: {}",
                cmd.entity_type
            )))));
        }
        let Some(light) = self.light_by_entity_id(&cmd.entity_id) else {
            return Box::pin(std::future::ready(Err(ServiceError::NotFound(format!(
                "Unknown entity: {}",
                cmd.entity_id
            )))));
        };

        let action = match light_action(&cmd, light.is_on()) {
            Ok(action) => action,
            Err(e) => return Box::pin(std::future::ready(Err(e))),
        };
        debug!("[{}] {action:?} with {}", cmd.entity_id, light.controller().switch_method());

        let controller = light.controller().clone();
        Box::pin(async move {
            controller
                .execute(action)
                .await
                .map_err(ServiceError::from)
        })
    }
}

impl Handler<StateChanged> for CrownstoneManager {
    type Result = ();

    fn handle(&mut self, msg: StateChanged, _ctx: &mut Self::Context) -> Self::Result {
        self.publish_state(&msg.cloud_id);
    }
}

impl Handler<SetUseUsb> for CrownstoneManager {
    type Result = Result<UsbOptionChange, ServiceError>;

    fn handle(&mut self, msg: SetUseUsb, ctx: &mut Self::Context) -> Self::Result {
        let change = self.usb_settings.set_use_usb(msg.use_usb);
        match change {
            UsbOptionChange::Unchanged => {}
            UsbOptionChange::SetupRequired => {
                info!("Crownstone USB dongle enabled, USB setup required")
            }
            UsbOptionChange::Disabled => {
                save_user_settings(&self.settings_file, &self.usb_settings)?;
                if let Some(usb) = self.usb.take() {
                    usb.stop();
                }
                info!("Crownstone USB dongle disabled, recreating entities");
                self.create_entities(ctx);
                for cloud_id in self.lights.keys() {
                    self.publish_entity(cloud_id);
                }
                self.publish_all_states();
            }
        }
        Ok(change)
    }
}

impl Handler<Unload> for CrownstoneManager {
    type Result = ();

    fn handle(&mut self, _: Unload, ctx: &mut Self::Context) -> Self::Result {
        info!("Unloading Crownstone integration");
        if let Some(usb) = self.usb.as_ref() {
            usb.stop();
        }
        self.lights.clear();
        self.subscribers.clear();
        ctx.stop();
    }
}
