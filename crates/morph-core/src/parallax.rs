//! # Pointer Parallax
//!
//! Pointer position is smoothed per axis and turned into a small rotation and
//! offset of the morph group plus an opposite tilt of the camera.

use crate::animation::{lerp, scoped};
use crate::types::Viewport;
use glam::Vec3;
use std::f64::consts::PI;

/// Smoothing rate per frame at an ease multiplier of 1.
pub const BASE_EASE: f64 = 0.1;
/// Group rotation per unit of pointer offset (radians).
pub const GROUP_ROTATION: f64 = PI * 0.125;
/// Group translation per unit of pointer offset.
pub const GROUP_OFFSET: f64 = 100.0;
/// Camera rotation per unit of pointer offset (radians).
pub const CAMERA_ROTATION: f64 = PI * -0.05;

/// Smoothed value chasing a target.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AxisState {
    pub current: f64,
    pub target: f64,
}

impl AxisState {
    /// Moves `current` a fraction `ease` of the way to `target`.
    pub fn step(&mut self, ease: f64) {
        self.current = lerp(self.current, self.target, ease);
    }
}

/// Maps a screen coordinate to `[-1, 1]` with the viewport centre at 0.
pub fn normalize_pointer(value: f64, size: f64) -> f64 {
    scoped(value, size / 2.0, size)
}

/// Per-frame smoothing factor for a host ease multiplier, kept within `[0, 1]`.
pub fn frame_ease(ease_multiplier: f64) -> f64 {
    (BASE_EASE * ease_multiplier).clamp(0.0, 1.0)
}

/// Transforms derived from the smoothed pointer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ParallaxPose {
    pub group_rotation: Vec3,
    pub group_position: Vec3,
    pub camera_rotation: Vec3,
}

#[derive(Clone, Debug, Default)]
pub struct Parallax {
    pub x: AxisState,
    pub y: AxisState,
}

impl Parallax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pointer move in screen space.
    pub fn set_pointer(&mut self, x: f64, y: f64, viewport: Viewport) {
        self.x.target = normalize_pointer(x, viewport.width as f64);
        self.y.target = normalize_pointer(y, viewport.height as f64);
    }

    /// Advances both axes one frame and returns the resulting pose.
    pub fn update(&mut self, ease_multiplier: f64) -> ParallaxPose {
        let ease = frame_ease(ease_multiplier);
        self.x.step(ease);
        self.y.step(ease);
        self.pose()
    }

    pub fn pose(&self) -> ParallaxPose {
        let x = self.x.current;
        let y = self.y.current;
        ParallaxPose {
            group_rotation: Vec3::new((y * GROUP_ROTATION) as f32, (x * GROUP_ROTATION) as f32, 0.0),
            group_position: Vec3::new((y * GROUP_OFFSET) as f32, (x * GROUP_OFFSET) as f32, 0.0),
            camera_rotation: Vec3::new((y * CAMERA_ROTATION) as f32, (x * CAMERA_ROTATION) as f32, 0.0),
        }
    }
}
