//! Camera input and frame handling.
//!
//! This module provides abstractions for capturing frames from a camera
//! and the configuration records loaded at startup. The camera is an
//! external collaborator: the detector only asks it for the next frame.

mod camera;
mod config;
mod frame;

#[cfg(feature = "camera")]
pub use camera::NokhwaCamera;
pub use camera::{Camera, CameraError, MockCamera, MockScene};
pub(crate) use config::check_unit;
pub use config::{CaptureConfig, ConfigError, FileConfig, OutputConfig};
pub use frame::{Frame, PixelFormat};
