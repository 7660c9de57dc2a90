//! Device sources for `padbridge`.
//!
//! Implementations of [`DeviceSource`](crate::device::DeviceSource).
//!
//! # Feature flags
//! - **`gilrs`**: real gamepads through the `gilrs` crate.
//!
//! The in-memory [`virtual_input`] source and the JSON-[`script`]ed player are
//! always available; tests and the CLI's scripted mode use them.

use crate::device::DeviceSource;
use crate::error::BridgeError;

#[cfg(feature = "gilrs")]
#[cfg_attr(docsrs, doc(cfg(feature = "gilrs")))]
pub mod gilrs_input;
pub mod script;
pub mod virtual_input;

/// The hardware source for this build.
///
/// Fails with [`BridgeError::Backend`] when no hardware backend was compiled in
/// or the backend could not start.
pub fn hardware_source() -> Result<Box<dyn DeviceSource>, BridgeError> {
    #[cfg(feature = "gilrs")]
    {
        let source = gilrs_input::GilrsSource::new()?;
        Ok(Box::new(source))
    }

    #[cfg(not(feature = "gilrs"))]
    {
        Err(BridgeError::Backend(
            "no hardware backend compiled in (enable the `gilrs` feature)".into(),
        ))
    }
}
