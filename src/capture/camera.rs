//! Camera abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.

use super::{CaptureConfig, Frame};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
///
/// The detector only needs frames on demand; permission handshakes and
/// stream negotiation stay behind this boundary.
pub trait Camera {
    /// Opens and initializes the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases resources.
    fn close(&mut self);
}

/// What the synthetic lamp panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockScene {
    /// All lamps lit green.
    #[default]
    Green,
    /// All lamps lit red.
    Red,
    /// Green lamps blinking with the given half-period in frames.
    Blink { half_period: u32 },
    /// Lamps off and no ambient light.
    Dark,
    /// Green lamps with one red lamp among them.
    Mixed,
}

const LAMP_COUNT: u32 = 8;
const GREEN_LAMP: [u8; 3] = [40, 210, 60];
const RED_LAMP: [u8; 3] = [220, 40, 35];

/// Mock camera that renders a synthetic indicator panel.
///
/// A row of square lamps sits in the top-right band of the frame, where
/// the default region of interest is anchored.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    scene: MockScene,
    sequence: u64,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock camera rendering the given scene.
    pub fn with_scene(scene: MockScene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    /// Switches the rendered scene; takes effect on the next capture.
    pub fn set_scene(&mut self, scene: MockScene) {
        self.scene = scene;
    }

    fn lamp_color(&self, index: u32) -> Option<[u8; 3]> {
        match self.scene {
            MockScene::Green => Some(GREEN_LAMP),
            MockScene::Red => Some(RED_LAMP),
            MockScene::Dark => None,
            MockScene::Mixed if index == LAMP_COUNT / 2 => Some(RED_LAMP),
            MockScene::Mixed => Some(GREEN_LAMP),
            MockScene::Blink { half_period } => {
                let phase = self.sequence / u64::from(half_period.max(1));
                (phase % 2 == 0).then_some(GREEN_LAMP)
            }
        }
    }

    fn render(&self, config: &CaptureConfig) -> Vec<u8> {
        let (w, h) = (config.width, config.height);
        let bpp = config.format.bytes_per_pixel();
        let mut pixels = vec![0u8; (w as usize) * (h as usize) * bpp];

        if self.scene != MockScene::Dark {
            for y in 0..h {
                for x in 0..w {
                    // Mild deterministic texture so the background is not flat
                    let n = ((x * 7 + y * 13) as u64 + self.sequence) % 9;
                    let base = 34 + n as u8;
                    let idx = ((y as usize) * (w as usize) + x as usize) * bpp;
                    pixels[idx] = base;
                    pixels[idx + 1] = base + 3;
                    pixels[idx + 2] = base + 7;
                }
            }
        }

        let size = (w / 40).max(4);
        let left = w * 58 / 100;
        let right = w * 95 / 100;
        let gap = (right.saturating_sub(left)) / LAMP_COUNT;
        let top = (h * 12 / 100).saturating_sub(size / 2);

        for lamp in 0..LAMP_COUNT {
            let Some(color) = self.lamp_color(lamp) else {
                continue;
            };
            let x0 = left + lamp * gap;
            for y in top..(top + size).min(h) {
                for x in x0..(x0 + size).min(w) {
                    let idx = ((y as usize) * (w as usize) + x as usize) * bpp;
                    pixels[idx..idx + 3].copy_from_slice(&color);
                }
            }
        }

        if bpp == 4 {
            pixels.chunks_exact_mut(4).for_each(|px| px[3] = 255);
        }
        pixels
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!(scene = ?self.scene, "MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        let pixels = self.render(config);

        self.sequence += 1;
        Ok(Frame::with_format(
            pixels,
            config.width,
            config.height,
            config.format,
            self.sequence,
        ))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("MockCamera closed");
    }
}

/// Hardware camera backed by `nokhwa`.
#[cfg(feature = "camera")]
pub struct NokhwaCamera {
    inner: Option<nokhwa::Camera>,
    sequence: u64,
}

#[cfg(feature = "camera")]
impl NokhwaCamera {
    pub fn new() -> Self {
        Self {
            inner: None,
            sequence: 0,
        }
    }
}

#[cfg(feature = "camera")]
impl Default for NokhwaCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "camera")]
impl Camera for NokhwaCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{
            CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
            Resolution,
        };

        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width, config.height),
                FrameFormat::MJPEG,
                config.fps,
            ),
        ));
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(config.device_id), requested)
            .map_err(|e| CameraError::DeviceNotFound(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        tracing::info!(device = config.device_id, "Camera stream opened");
        self.inner = Some(camera);
        self.sequence = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        use nokhwa::pixel_format::RgbFormat;

        let camera = self.inner.as_mut().ok_or(CameraError::NotInitialized)?;
        let buffer = camera
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let (width, height) = (image.width(), image.height());

        self.sequence += 1;
        Ok(Frame::new(image.into_raw(), width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.inner.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Failed to stop camera stream: {}", e);
            }
        }
        tracing::info!("Camera closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_lifecycle() {
        let mut camera = MockCamera::new();
        let config = CaptureConfig::with_dimensions(320, 240);

        assert!(!camera.is_open());

        camera.open(&config).unwrap();
        assert!(camera.is_open());

        let frame = camera.capture().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let frame2 = camera.capture().unwrap();
        assert_eq!(frame2.sequence(), 2);

        camera.close();
        assert!(!camera.is_open());
    }

    #[test]
    fn test_capture_without_open() {
        let mut camera = MockCamera::new();
        assert!(matches!(
            camera.capture(),
            Err(CameraError::NotInitialized)
        ));
    }

    #[test]
    fn test_dark_scene_is_black() {
        let mut camera = MockCamera::with_scene(MockScene::Dark);
        camera.open(&CaptureConfig::with_dimensions(64, 48)).unwrap();
        let frame = camera.capture().unwrap();
        assert!(frame.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_blink_alternates_lamps() {
        let config = CaptureConfig::with_dimensions(320, 240);
        let mut camera = MockCamera::with_scene(MockScene::Blink { half_period: 1 });
        camera.open(&config).unwrap();

        // Probe the center of the first lamp
        let (x, y) = (320 * 58 / 100 + 4, 240 * 12 / 100);
        let lit = camera.capture().unwrap().rgb(x, y).unwrap();
        let unlit = camera.capture().unwrap().rgb(x, y).unwrap();

        assert_eq!(lit, GREEN_LAMP);
        assert_ne!(unlit, GREEN_LAMP);
    }
}
