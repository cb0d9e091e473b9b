// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Configuration file handling.

use crate::errors::ServiceError;
use crate::util::serial::get_serial_by_id;
use config::Config;
use log::{error, info, warn};
use serde_with::{DurationMilliSeconds, NoneAsEmptyString, serde_as};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use url::Url;

/// Default configuration file.
pub const DEF_CONFIG_FILE: &str = "configuration.yaml";

pub const DEF_CLOUD_URL: &str = "https://cloud.crownstone.rocks/api/";

const ENV_USER_CFG_FILENAME: &str = "UC_USER_CFG_FILENAME";
const DEV_USER_CFG_FILENAME: &str = "crownstone.json";

/// Environment variable for the user configuration directory.
///
/// This ENV variable is set on the Remote device to the integration specific data directory.
const ENV_CONFIG_HOME: &str = "UC_CONFIG_HOME";

/// Environment variable for the credential files directory.
const ENV_TOKENS_HOME: &str = "UC_TOKENS_HOME";

/// External system `token_id` holding the Crownstone account password.
const TOKEN_ID: &str = "crownstone-cloud";

/// Environment variable to disable the Crownstone USB dongle: all commands are sent to the cloud.
pub const ENV_DISABLE_USB: &str = "UC_DISABLE_USB";

#[derive(Default, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub cloud: CloudSettings,
    pub usb: UsbSettings,
}

#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct CloudSettings {
    pub url: Url,
    pub email: String,
    password: String,
    /// Cloud request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u8,
    /// Cloud data snapshot file in json format, used instead of synchronizing with the cloud.
    #[serde(default)]
    pub data_file: Option<String>,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            url: Url::parse(DEF_CLOUD_URL).unwrap(),
            email: "".to_string(),
            password: "".to_string(),
            request_timeout: default_request_timeout(),
            data_file: None,
        }
    }
}

impl CloudSettings {
    /// Return the Crownstone account password.
    ///
    /// This is either the provided password in the external system, or the local configuration
    /// password.
    pub fn get_password(&self) -> String {
        self.get_token_value(TOKEN_ID)
            .unwrap_or_else(|| self.password.clone())
    }

    pub fn set_password(&mut self, password: impl AsRef<str>) {
        self.password = password.as_ref().trim().to_string();
    }

    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.get_password().is_empty()
    }

    /// Get the value of an external system token key.
    ///
    /// returns: None if the token file doesn't exist or the file couldn't be read.
    fn get_token_value(&self, key: &str) -> Option<String> {
        let mut path = PathBuf::from(env::var(ENV_TOKENS_HOME).ok()?);
        path.push(key);
        if !path.is_file() {
            info!("Token file '{key}' does not exist. Using local configuration.");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(v) => Some(v.trim().to_string()),
            Err(e) => {
                error!("Error reading token file '{key}', using local configuration. {e}");
                None
            }
        }
    }
}

fn default_request_timeout() -> u8 {
    10
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct UsbSettings {
    /// Crownstone USB dongle serial port, preferably a `/dev/serial/by-id` link.
    ///
    /// An empty value disables the dongle.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub path: Option<String>,
    /// Maximum time to wait for the dongle initialization.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "init_timeout_ms", default = "default_init_timeout")]
    pub init_timeout: Duration,
}

impl Default for UsbSettings {
    fn default() -> Self {
        Self {
            path: None,
            init_timeout: default_init_timeout(),
        }
    }
}

fn default_init_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Result of changing the "use Crownstone USB" option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbOptionChange {
    Unchanged,
    /// The configured dongle was removed, the entities must be reloaded without dongle.
    Disabled,
    /// No dongle is configured yet, the USB setup flow must be started.
    SetupRequired,
}

impl UsbSettings {
    pub fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    /// Configure the dongle with the selected serial device, e.g. `/dev/ttyUSB0`.
    ///
    /// The stable `/dev/serial/by-id` link of the device is stored if available.
    pub fn set_port(&mut self, dev_path: &str) {
        self.path = Some(get_serial_by_id(dev_path));
    }

    /// Apply the "use Crownstone USB" option.
    ///
    /// Disabling the option removes the configured dongle path.
    pub fn set_use_usb(&mut self, use_usb: bool) -> UsbOptionChange {
        match (use_usb, self.is_configured()) {
            (false, true) => {
                self.path = None;
                UsbOptionChange::Disabled
            }
            (true, false) => UsbOptionChange::SetupRequired,
            _ => UsbOptionChange::Unchanged,
        }
    }
}

/// Load the configuration settings.
///
/// The application provides default values which can be overriden in the following order:
/// 1. Configuration settings in the read-only yaml configuration file specified in `filename`
/// 2. User provided configuration settings from the driver setup
/// 3. Environment variables with prefix `UC_` (works only for cfg keys not containing a `_`!)
///
/// If there's a configuration load error, the configuration will be reloaded without the user
/// provided configuration settings for auto-recovery with default values.
pub fn get_configuration(filename: Option<&str>) -> Result<Settings, config::ConfigError> {
    let user_config = user_settings_path();
    if !user_config.is_file() {
        info!("No user settings file found");
        return load_configuration(filename, None);
    }

    match load_configuration(filename, Some(user_config)) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            error!("Error loading configuration, retrying without user configuration. Error: {e}");
            load_configuration(filename, None)
        }
    }
}

fn load_configuration(
    filename: Option<&str>,
    user_config: Option<PathBuf>,
) -> Result<Settings, config::ConfigError> {
    // default configuration
    let mut config = Config::builder().add_source(Config::try_from(&Settings::default())?);
    // read optional configuration file to override defaults
    if let Some(filename) = filename {
        config = config.add_source(config::File::with_name(filename));
    }

    // Overlay user provided configuration file from driver setup flow.
    if let Some(user_config) = user_config {
        config = config.add_source(config::File::from(user_config));
    }

    // Add in settings from the environment (with a prefix of UC)
    // E.g. `UC_CLOUD_EMAIL=user@example.com` would set the `cloud.email` key
    let config = config
        .add_source(config::Environment::with_prefix("UC").separator("_"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    check_cfg_values(settings)
}

fn check_cfg_values(mut settings: Settings) -> Result<Settings, config::ConfigError> {
    match settings.cloud.url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(config::ConfigError::Message(format!(
                "invalid scheme in cloud.url: {scheme}. Valid: [http, https]"
            )));
        }
    }

    if let Some(path) = settings.usb.path.as_deref()
        && !Path::new(path).is_absolute()
    {
        return Err(config::ConfigError::Message(format!(
            "invalid usb.path: {path}. An absolute device path is required"
        )));
    }

    if settings.usb.init_timeout.as_millis() < 100 {
        warn!("Invalid USB dongle initialization timeout, using default.");
        settings.usb.init_timeout = default_init_timeout();
    }

    Ok(settings)
}

/// Wrapper to add the `usb` root property to make it compatible with the main configuration file.
#[derive(serde::Deserialize, serde::Serialize)]
struct UserSettingsWrapper {
    usb: UsbSettings,
}

/// Store the USB dongle configuration from the setup or options flow.
///
/// The default location is returned by [`user_settings_path`].
pub fn save_user_settings(path: &Path, cfg: &UsbSettings) -> Result<(), ServiceError> {
    let cfg = UserSettingsWrapper { usb: cfg.clone() };
    fs::write(path, serde_json::to_string_pretty(&cfg)?).map_err(|e| {
        let msg = format!("Error saving user configuration: {e}");
        error!("{msg}");
        ServiceError::InternalServerError(msg)
    })?;
    Ok(())
}

/// Get user configuration file path.
///
/// This configuration file is updatable with [`save_user_settings`] from the driver options flow.
///
/// The configuration file is located in the configuration directory specified in the env variable
/// `UC_CONFIG_HOME`. If not set, the current directory is used.
pub fn user_settings_path() -> PathBuf {
    let file = env::var(ENV_USER_CFG_FILENAME).unwrap_or(DEV_USER_CFG_FILENAME.into());
    Path::new(&env::var(ENV_CONFIG_HOME).unwrap_or_default()).join(file)
}
