// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Serial port name resolution.
//!
//! The Crownstone USB dongle is configured with its stable `/dev/serial/by-id` link, since the
//! `/dev/ttyUSB#` name may change between reboots.

use log::debug;
use std::fs;
use std::path::Path;

/// Directory with persistent serial device links.
pub const SERIAL_BY_ID: &str = "/dev/serial/by-id";

/// Return the `/dev/serial/by-id` link for the given device path if available.
///
/// Returns the device path if no link resolves to it.
pub fn get_serial_by_id(dev_path: &str) -> String {
    serial_by_id_in(Path::new(SERIAL_BY_ID), dev_path)
}

fn serial_by_id_in(by_id: &Path, dev_path: &str) -> String {
    let Ok(entries) = fs::read_dir(by_id) else {
        return dev_path.to_string();
    };

    let target = Path::new(dev_path);
    for entry in entries.flatten() {
        let path = entry.path();
        let is_symlink = entry
            .file_type()
            .map(|t| t.is_symlink())
            .unwrap_or_default();
        if is_symlink && fs::canonicalize(&path).is_ok_and(|p| p == target) {
            debug!("Resolved {dev_path} to {}", path.display());
            return path.to_string_lossy().into_owned();
        }
    }
    dev_path.to_string()
}

/// Get the port name a `/dev/serial/by-id` link points to, e.g. `ttyUSB0`.
///
/// Returns `None` if the link doesn't exist, for example if the dongle is not plugged in.
pub fn get_port(by_id: impl AsRef<Path>) -> Option<String> {
    let target = fs::read_link(by_id).ok()?;
    target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::os::unix::fs::symlink;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!(
            "uc-intg-crownstone-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn get_port_returns_link_target_name() {
        let dir = temp_dir("port");
        let link = dir.join("usb-Crownstone_dongle-if00-port0");
        symlink("../../ttyUSB3", &link).unwrap();

        assert_eq!(Some("ttyUSB3".to_string()), get_port(&link));
        assert_eq!(None, get_port(dir.join("missing")));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn serial_by_id_returns_matching_link() {
        let dir = temp_dir("by-id");
        let device = dir.join("ttyUSB0");
        fs::write(&device, b"").unwrap();
        let device = fs::canonicalize(&device).unwrap();
        let link = dir.join("usb-Crownstone_dongle-if00");
        symlink(&device, &link).unwrap();

        let dev_path = device.to_string_lossy().into_owned();
        assert_eq!(
            link.to_string_lossy().into_owned(),
            serial_by_id_in(&dir, &dev_path)
        );
        assert_eq!("/dev/ttyACM9", serial_by_id_in(&dir, "/dev/ttyACM9"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn serial_by_id_without_directory_returns_device_path() {
        assert_eq!(
            "/dev/ttyUSB0",
            serial_by_id_in(Path::new("/nonexistent/serial/by-id"), "/dev/ttyUSB0")
        );
    }
}
