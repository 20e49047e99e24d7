pub mod error;
pub mod platform;

pub use error::PlatformError;
pub use platform::{DynPlatform, MAX_PAGE_SIZE, Platform, Upload};
