// NetShare - Configuration Storage
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Configuration file discovery and bootstrap.
//!
//! The configuration lives at `$XDG_CONFIG_HOME/netshare/config.toml`
//! unless an explicit path is given. A missing default file is not an
//! error; built-in defaults apply.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::models::{Config, Error, Result, CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Commented starter configuration written by `config init`.
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# netshare configuration
schema_version = "1.0.0"

# Which adapter shares its uplink to which.
[sharing]
public = "wlan0"
private = "usb0"

# Desired default-route metric per adapter (lower = preferred).
[priority]
usb0 = 100
wlan0 = 600

[service]
name = "NetworkManager"

[verify]
# Subnet the shared link is expected to land in. Uncomment to pin.
#expected_subnet = "192.168.137.0/24"
settle_wait_secs = 3
ping_target = "8.8.8.8"

# Inactive duplicates of connection profile names are reported; set this
# to true to also delete them during apply.
prune_duplicate_connections = false
"#;

/// Resolve the configuration directory.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Resolve the default configuration file path.
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Load the configuration.
///
/// An explicit path must exist; the default path may be absent, in which
/// case built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path),
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Loading configuration from {:?}", path);
                Config::load_from_file(&path)
            } else {
                debug!("No configuration file, using defaults");
                Ok(Config::default())
            }
        }
    }
}

/// Write the starter configuration file, refusing to overwrite.
pub fn init_config(path: Option<&Path>) -> Result<PathBuf> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    if path.exists() {
        return Err(Error::ConfigWriteFailed(format!(
            "{} already exists",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::ConfigWriteFailed(format!("{}: {}", parent.display(), e)))?;
        // Restrictive permissions on the config directory (0700)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));
        }
    }

    fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .map_err(|e| Error::ConfigWriteFailed(format!("{}: {}", path.display(), e)))?;
    info!("Wrote starter configuration to {:?}", path);
    Ok(path)
}
