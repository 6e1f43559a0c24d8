//! Screenshot files.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::env::{Environment, DEVICEFARM_SCREENSHOT_PATH};
use crate::driver::AutomationDriver;
use crate::result::PepeniumResult;

/// Directory used when `DEVICEFARM_SCREENSHOT_PATH` is unset
pub const DEFAULT_SCREENSHOT_DIR: &str = "/tmp";

/// Writes PNG screenshots as `screenshot_<epoch millis>.png`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotSink {
    dir: PathBuf,
}

impl ScreenshotSink {
    /// Sink writing into `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory from `DEVICEFARM_SCREENSHOT_PATH`, `/tmp` otherwise
    #[must_use]
    pub fn from_env(env: &Environment) -> Self {
        Self::new(env.get_or(DEVICEFARM_SCREENSHOT_PATH, DEFAULT_SCREENSHOT_DIR))
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a capture taken now
    #[must_use]
    pub fn next_file_name() -> String {
        format!("screenshot_{}.png", Utc::now().timestamp_millis())
    }

    /// Write `png`, creating the directory, and return the absolute path
    pub fn write(&self, png: &[u8]) -> PepeniumResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::next_file_name());
        fs::write(&path, png)?;
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()?.join(path)
        };
        info!(path = %path.display(), bytes = png.len(), "screenshot saved");
        Ok(path)
    }

    /// Capture the driver's screen and write it
    pub fn capture(&self, driver: &dyn AutomationDriver) -> PepeniumResult<PathBuf> {
        let png = driver.screenshot_png()?;
        self.write(&png)
    }
}
