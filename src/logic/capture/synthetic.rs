//! Synthetic Camera
//!
//! Stands in for a webcam: every frame is a flat image at the current pose
//! intensity plus uniform noise, so consecutive captures differ slightly.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use rand::Rng;

use super::{Frame, FrameSource};
use crate::error::{GuardError, GuardResult};

pub struct SyntheticCamera {
    width: usize,
    height: usize,
    noise: f32,
    pose: RwLock<f32>,
    connected: AtomicBool,
    sequence: AtomicU64,
}

impl SyntheticCamera {
    /// Open the camera. Zero-sized frames count as no device.
    pub fn open(width: usize, height: usize, noise: f32) -> GuardResult<Self> {
        if width == 0 || height == 0 {
            return Err(GuardError::CameraUnavailable(format!(
                "no capture device for {}x{} frames",
                width, height
            )));
        }
        if !noise.is_finite() || noise < 0.0 {
            return Err(GuardError::CameraUnavailable(format!("invalid noise level {}", noise)));
        }

        log::info!("Synthetic camera opened ({}x{}, noise {:.3})", width, height, noise);
        Ok(Self {
            width,
            height,
            noise,
            pose: RwLock::new(0.0),
            connected: AtomicBool::new(true),
            sequence: AtomicU64::new(0),
        })
    }

    /// Move the simulated subject to a new intensity level
    pub fn set_pose(&self, level: f32) {
        *self.pose.write() = level;
        log::debug!("Synthetic camera pose set to {:.2}", level);
    }

    pub fn pose(&self) -> f32 {
        *self.pose.read()
    }

    /// Simulate the device going away; later captures fail
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        log::warn!("Synthetic camera disconnected");
    }

    pub fn frames_captured(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl FrameSource for SyntheticCamera {
    fn acquire_frame(&self) -> GuardResult<Frame> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(GuardError::Capture("camera disconnected".into()));
        }

        let level = self.pose();
        let mut rng = rand::thread_rng();
        let pixels: Vec<f32> = (0..self.width * self.height)
            .map(|_| {
                if self.noise > 0.0 {
                    level + rng.gen_range(-self.noise..=self.noise)
                } else {
                    level
                }
            })
            .collect();

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        Ok(Frame::new(sequence, self.width, self.height, pixels))
    }
}
