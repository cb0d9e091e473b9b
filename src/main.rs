// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Crownstone integration test tool.
//!
//! Loads the configuration and a cloud data snapshot, creates the light entities and optionally
//! executes one light command. Commands are only logged, no cloud requests are sent. A configured
//! USB dongle is simulated as well.

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

use actix::{Actor, Context, Handler};
use clap::{Arg, Command};
use log::{info, warn};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use uc_api::EntityType;
use uc_api::intg::EntityCommand;
use uc_intg_crownstone::channel::{DryRunCloud, DryRunUart};
use uc_intg_crownstone::cloud::CloudData;
use uc_intg_crownstone::configuration::{DEF_CONFIG_FILE, ENV_DISABLE_USB, get_configuration};
use uc_intg_crownstone::manager::{
    CrownstoneManager, EntityCommandMsg, GetAvailableEntities, GetEntityStates, HostEvent,
    Subscribe, Unload, usb_dongle,
};
use uc_intg_crownstone::util::bool_from_env;
use uc_intg_crownstone::{APP_VERSION, built_info};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    let args = Command::new(built_info::PKG_NAME)
        .author("Unfolded Circle ApS")
        .version(APP_VERSION)
        .about("Crownstone integration test tool")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("FILE")
                .help("Crownstone cloud data snapshot (overrides cloud.data_file)"),
        )
        .arg(
            Arg::new("usb_port")
                .long("usb-port")
                .value_name("DEVICE")
                .help("Crownstone USB dongle serial device, e.g. /dev/ttyUSB0 (overrides usb.path)"),
        )
        .arg(
            Arg::new("entity")
                .short('e')
                .long("entity")
                .help("Light entity id for the command"),
        )
        .arg(
            Arg::new("cmd")
                .long("cmd")
                .value_parser(["on", "off", "toggle"])
                .requires("entity")
                .help("Light command"),
        )
        .arg(
            Arg::new("brightness")
                .short('b')
                .long("brightness")
                .value_parser(clap::value_parser!(u8))
                .help("Brightness 0..255 for the on command"),
        )
        .get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg_file = match args.get_one::<String>("config") {
        Some(c) => Some(c.as_str()),
        None if Path::new(DEF_CONFIG_FILE).exists() => {
            info!("Loading default configuration file: {DEF_CONFIG_FILE}");
            Some(DEF_CONFIG_FILE)
        }
        None => None,
    };
    let mut cfg = get_configuration(cfg_file)?;
    if let Some(port) = args.get_one::<String>("usb_port") {
        cfg.usb.set_port(port);
    }

    let data_file = args
        .get_one::<String>("data")
        .cloned()
        .or(cfg.cloud.data_file.clone())
        .ok_or_else(|| anyhow::anyhow!("No cloud data snapshot file specified"))?;
    let cloud_data = CloudData::load(&data_file)?;
    info!(
        "Loaded {} spheres from {data_file}",
        cloud_data.spheres.len()
    );
    if !cfg.cloud.has_credentials() {
        warn!("No Crownstone cloud credentials configured");
    }

    let usb = usb_dongle(
        &cfg.usb,
        bool_from_env(ENV_DISABLE_USB),
        Arc::new(DryRunUart),
    );
    let manager =
        CrownstoneManager::new(cloud_data, Arc::new(DryRunCloud), usb, cfg.usb.clone()).start();
    manager.send(Subscribe(EventPrinter.start().recipient())).await?;

    let entities = manager.send(GetAvailableEntities).await?;
    println!("{}", serde_json::to_string_pretty(&entities)?);

    if let (Some(entity_id), Some(cmd_id)) = (
        args.get_one::<String>("entity"),
        args.get_one::<String>("cmd"),
    ) {
        let params = args
            .get_one::<u8>("brightness")
            .map(|b| json!({ "brightness": b }))
            .and_then(|v| v.as_object().cloned());
        let cmd = EntityCommand {
            device_id: None,
            entity_type: EntityType::Light,
            entity_id: entity_id.clone(),
            cmd_id: cmd_id.clone(),
            params,
        };
        if let Err(e) = manager.send(EntityCommandMsg(cmd)).await? {
            anyhow::bail!("Command failed: {e}");
        }
        // let the state notification pass through
        actix::clock::sleep(Duration::from_millis(100)).await;

        let states = manager.send(GetEntityStates).await?;
        println!("{}", serde_json::to_string_pretty(&states)?);
    }

    manager.send(Unload).await?;

    Ok(())
}

/// Logs the manager's host notifications.
struct EventPrinter;

impl Actor for EventPrinter {
    type Context = Context<Self>;
}

impl Handler<HostEvent> for EventPrinter {
    type Result = ();

    fn handle(&mut self, msg: HostEvent, _ctx: &mut Self::Context) {
        let (kind, payload) = match msg {
            HostEvent::EntityChange(change) => ("entity_change", serde_json::to_string(&change)),
            HostEvent::EntityUpdate(entity) => ("entity_update", serde_json::to_string(&entity)),
        };
        match payload {
            Ok(json) => info!("<- {kind}: {json}"),
            Err(e) => warn!("Error serializing {kind}: {e}"),
        }
    }
}
