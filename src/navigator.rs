//! Opening an app's system details screen.
//!
//! Selecting an app in the list ends with one [`Navigator`] call carrying
//! the package id. The inventory itself never navigates.

use tracing::{debug, info};

use crate::registry::{Adb, RegistryError};

/// Intent action for the per-app settings screen.
pub const APPLICATION_DETAILS_SETTINGS: &str = "android.settings.APPLICATION_DETAILS_SETTINGS";

/// Something that can show the system details screen for a package.
pub trait Navigator {
    /// Open the details screen for `package_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be delivered.
    fn open_app_details(&self, package_id: &str) -> Result<(), RegistryError>;
}

/// The data URI identifying a package to the settings activity.
#[must_use]
pub fn settings_uri(package_id: &str) -> String {
    format!("package:{package_id}")
}

/// Starts the settings activity on the device through `adb shell am start`.
#[derive(Clone, Debug)]
pub struct AdbNavigator {
    adb: Adb,
}

impl AdbNavigator {
    #[must_use]
    pub const fn new(adb: Adb) -> Self {
        Self { adb }
    }
}

impl Navigator for AdbNavigator {
    fn open_app_details(&self, package_id: &str) -> Result<(), RegistryError> {
        let uri = settings_uri(package_id);
        info!("opening app details for {package_id}");

        let output = self.adb.shell(&[
            "am",
            "start",
            "-a",
            APPLICATION_DETAILS_SETTINGS,
            "-d",
            uri.as_str(),
        ])?;
        debug!("am start: {}", output.trim());

        // `am start` exits 0 even when the intent cannot be resolved.
        if start_failed(&output) {
            return Err(RegistryError::UnexpectedOutput {
                command: format!("am start -a {APPLICATION_DETAILS_SETTINGS} -d {uri}"),
                output: output.trim().to_string(),
            });
        }

        Ok(())
    }
}

fn start_failed(output: &str) -> bool {
    output
        .lines()
        .any(|line| line.trim_start().starts_with("Error"))
}
