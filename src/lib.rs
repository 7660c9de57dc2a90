//! padbridge: gamepad state forwarded to a host application as bridge commands.
//!
//! A [`Bridge`] polls one active device from a [`DeviceSource`] on a fixed
//! timer and reports what changed through a single [`Sink`] call, one
//! `::`-delimited string per change (see [`command`] for the grammar).

pub mod backends;
pub mod bridge;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod runtime;
pub mod sink;
pub mod snapshot;
pub mod timer;

pub use backends::virtual_input::VirtualSource;
pub use bridge::*;
pub use command::Command;
pub use config::*;
pub use device::*;
pub use error::*;
pub use event::*;
pub use sink::*;
