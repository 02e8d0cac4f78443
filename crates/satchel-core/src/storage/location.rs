//! Where an application's storage lives on this machine.
//!
//! [`PlatformEnvironment::detect`] captures the handful of environment facts
//! the layout depends on; [`resolve_directory`] turns them into a directory
//! without touching the filesystem, so the layout can be checked for any
//! platform from any platform.
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::kernel::constants::{APPDATA_ENV, MACOS_APP_SUPPORT_DIR, WINDOWS_APP_DATA_DIR};

/// Operating system family, as far as storage layout is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    /// Linux, the BSDs and anything else
    Unix,
}

impl OsFamily {
    /// Family of the platform this binary was built for
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else {
            OsFamily::Unix
        }
    }
}

impl FromStr for OsFamily {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Ok(if lower.starts_with("windows") || lower == "win32" {
            OsFamily::Windows
        } else if lower == "macos" || lower == "osx" || lower == "mac" || lower.starts_with("mac os") {
            OsFamily::MacOs
        } else {
            OsFamily::Unix
        })
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Windows => write!(f, "windows"),
            OsFamily::MacOs => write!(f, "macos"),
            OsFamily::Unix => write!(f, "unix"),
        }
    }
}

/// The environment facts directory resolution depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformEnvironment {
    /// User home directory; `None` when it cannot be determined
    pub user_home: Option<PathBuf>,
    pub os_family: OsFamily,
    /// Roaming application data directory, only set when it is an existing directory
    pub app_data: Option<PathBuf>,
}

impl PlatformEnvironment {
    /// Capture the environment of the running process
    pub fn detect() -> Self {
        let os_family = OsFamily::current();
        let app_data = match os_family {
            OsFamily::Windows => env::var_os(APPDATA_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .filter(|dir| dir.is_dir()),
            _ => None,
        };
        Self {
            user_home: dirs::home_dir(),
            os_family,
            app_data,
        }
    }

    /// An environment with the given home and family and no `APPDATA`
    pub fn new(user_home: impl Into<PathBuf>, os_family: OsFamily) -> Self {
        Self {
            user_home: Some(user_home.into()),
            os_family,
            app_data: None,
        }
    }

    pub fn with_app_data(mut self, app_data: impl Into<PathBuf>) -> Self {
        self.app_data = Some(app_data.into());
        self
    }
}

/// Compute the storage directory for an application.
///
/// Returns `None` when the user home is unknown.
pub fn resolve_directory(
    env: &PlatformEnvironment,
    application_id: &str,
    vendor_id: &str,
) -> Option<PathBuf> {
    let user_home = env.user_home.as_ref()?;
    let directory = match env.os_family {
        OsFamily::Windows => match &env.app_data {
            // ${APPDATA}\${vendorId}\${applicationId}
            Some(app_data) => app_data.join(vendor_id).join(application_id),
            // ${userHome}\Application Data\${vendorId}\${applicationId}
            None => user_home
                .join(WINDOWS_APP_DATA_DIR)
                .join(vendor_id)
                .join(application_id),
        },
        // ${userHome}/Library/Application Support/${applicationId}
        OsFamily::MacOs => user_home.join(MACOS_APP_SUPPORT_DIR).join(application_id),
        // ${userHome}/.${applicationId}
        OsFamily::Unix => user_home.join(format!(".{}", application_id)),
    };
    Some(directory)
}
