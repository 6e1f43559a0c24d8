//! Configuration: environment snapshot and BrowserStack YAML records.

pub mod browserstack;
pub mod env;

pub use browserstack::{
    load_yaml, AppPlatform, BrowserStackAppConfig, BrowserStackConfig, BrowserStackDesktopConfig,
    BrowserStackMobileWebConfig, DesktopPlatform, MobileWebPlatform,
};
pub use env::Environment;
