//! # Render Host
//!
//! Headless stand-in for the render loop: it owns the clock, the scene graph
//! and the camera, and dispatches frame ticks and pointer moves to subscribers.
//!
//! Subscribers register boxed callbacks and get a [`Subscription`] handle back;
//! handing the handle to [`RenderHost::unsubscribe`] removes the callback.
//! Frame callbacks run in subscription order.

use crate::scene::{NodeKind, SceneGraph, SceneNode};
use crate::types::{NodeId, Transform3, Viewport};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Reference frame length used to normalise the ease multiplier.
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Host-level settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub width: f32,
    pub height: f32,
    /// Frame rate used by [`RenderHost::step`].
    pub fps: u32,
    /// Freezes eased motion (ease multiplier 0).
    pub reduced_motion: bool,
    /// Upper bound for the ease multiplier after long frames.
    pub max_ease_multiplier: f64,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Camera distance from the scene origin.
    pub perspective: f32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            fps: 60,
            reduced_motion: false,
            max_ease_multiplier: 4.0,
            fov: 60.0,
            perspective: 2000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub transform: Transform3,
    pub fov: f32,
}

impl Camera {
    pub fn new(fov: f32, perspective: f32) -> Self {
        let mut transform = Transform3::new();
        transform.position.z = perspective;
        Self { transform, fov }
    }
}

/// Everything a frame callback may read or touch.
pub struct FrameContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub camera: &'a mut Camera,
    /// Clock in milliseconds since the host started.
    pub time: f64,
    /// Frame length relative to a 60 Hz frame (after host scaling).
    pub ease_multiplier: f64,
}

/// A pointer move in screen-space pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub viewport: Viewport,
}

pub type FrameCallback = Box<dyn FnMut(&mut FrameContext<'_>) + Send>;
pub type PointerCallback = Box<dyn FnMut(&PointerEvent) + Send>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubscriptionKind {
    Frame,
    Pointer,
}

/// Disposer handle for a registered callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub id: u64,
    pub kind: SubscriptionKind,
}

pub struct RenderHost {
    pub scene: SceneGraph,
    pub root: NodeId,
    pub camera: Camera,
    pub viewport: Viewport,
    pub config: HostConfig,
    /// Clock in milliseconds.
    pub time: f64,
    pub ease_multiplier: f64,
    pub frame: u64,
    frame_callbacks: Vec<(u64, FrameCallback)>,
    pointer_callbacks: Vec<(u64, PointerCallback)>,
    next_id: u64,
}

impl RenderHost {
    pub fn new(config: HostConfig) -> Self {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(SceneNode::new("scene", NodeKind::Group));
        Self {
            scene,
            root,
            camera: Camera::new(config.fov, config.perspective),
            viewport: Viewport::new(config.width, config.height),
            time: 0.0,
            ease_multiplier: 1.0,
            frame: 0,
            frame_callbacks: Vec::new(),
            pointer_callbacks: Vec::new(),
            next_id: 0,
            config,
        }
    }

    pub fn on_frame(&mut self, callback: FrameCallback) -> Subscription {
        let id = self.allocate_id();
        self.frame_callbacks.push((id, callback));
        Subscription {
            id,
            kind: SubscriptionKind::Frame,
        }
    }

    pub fn on_pointer_move(&mut self, callback: PointerCallback) -> Subscription {
        let id = self.allocate_id();
        self.pointer_callbacks.push((id, callback));
        Subscription {
            id,
            kind: SubscriptionKind::Pointer,
        }
    }

    /// Removes a callback; returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before;
        let after;
        match subscription.kind {
            SubscriptionKind::Frame => {
                before = self.frame_callbacks.len();
                self.frame_callbacks.retain(|(id, _)| *id != subscription.id);
                after = self.frame_callbacks.len();
            }
            SubscriptionKind::Pointer => {
                before = self.pointer_callbacks.len();
                self.pointer_callbacks.retain(|(id, _)| *id != subscription.id);
                after = self.pointer_callbacks.len();
            }
        }
        before != after
    }

    pub fn subscriber_count(&self) -> usize {
        self.frame_callbacks.len() + self.pointer_callbacks.len()
    }

    /// Runs one frame of `delta_ms` milliseconds.
    pub fn tick(&mut self, delta_ms: f64) {
        let delta = delta_ms.max(0.0);
        self.time += delta;
        self.frame += 1;
        self.ease_multiplier = if self.config.reduced_motion {
            0.0
        } else {
            (delta / REFERENCE_FRAME_MS).clamp(0.0, self.config.max_ease_multiplier)
        };
        trace!(frame = self.frame, time = self.time, "Frame tick");

        for (_, callback) in self.frame_callbacks.iter_mut() {
            let mut ctx = FrameContext {
                scene: &mut self.scene,
                camera: &mut self.camera,
                time: self.time,
                ease_multiplier: self.ease_multiplier,
            };
            callback(&mut ctx);
        }
    }

    /// Runs one frame at the configured frame rate.
    pub fn step(&mut self) {
        let fps = self.config.fps.max(1) as f64;
        self.tick(1000.0 / fps);
    }

    pub fn dispatch_pointer_move(&mut self, x: f64, y: f64) {
        let event = PointerEvent {
            x,
            y,
            viewport: self.viewport,
        };
        for (_, callback) in self.pointer_callbacks.iter_mut() {
            callback(&event);
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for RenderHost {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn frame_callbacks_run_in_order_until_unsubscribed() {
        let mut host = RenderHost::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first_log = Arc::clone(&log);
        let first = host.on_frame(Box::new(move |_: &mut FrameContext<'_>| first_log.lock().unwrap().push("first")));
        let second_log = Arc::clone(&log);
        host.on_frame(Box::new(move |_: &mut FrameContext<'_>| second_log.lock().unwrap().push("second")));

        host.step();
        assert!(host.unsubscribe(first));
        assert!(!host.unsubscribe(first));
        host.step();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "second"]);
    }

    #[test]
    fn ease_multiplier_tracks_frame_length() {
        let mut host = RenderHost::default();
        host.tick(REFERENCE_FRAME_MS * 2.0);
        assert!((host.ease_multiplier - 2.0).abs() < 1e-9);
        host.tick(10_000.0);
        assert_eq!(host.ease_multiplier, host.config.max_ease_multiplier);
    }

    #[test]
    fn frame_callbacks_see_clock_and_ease() {
        let mut host = RenderHost::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        host.on_frame(Box::new(move |ctx: &mut FrameContext<'_>| {
            sink.lock().unwrap().push((ctx.time, ctx.ease_multiplier))
        }));

        host.tick(REFERENCE_FRAME_MS);
        host.tick(REFERENCE_FRAME_MS * 2.0);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (REFERENCE_FRAME_MS, 1.0));
        assert!((seen[1].0 - REFERENCE_FRAME_MS * 3.0).abs() < 1e-9);
        assert!((seen[1].1 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn reduced_motion_freezes_easing() {
        let mut host = RenderHost::new(HostConfig {
            reduced_motion: true,
            ..HostConfig::default()
        });
        host.step();
        assert_eq!(host.ease_multiplier, 0.0);
        assert!(host.time > 0.0);
    }

    #[test]
    fn pointer_events_carry_viewport() {
        let mut host = RenderHost::default();
        host.resize(100.0, 50.0);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        host.on_pointer_move(Box::new(move |event: &PointerEvent| *sink.lock().unwrap() = Some(*event)));
        host.dispatch_pointer_move(10.0, 20.0);
        let event = seen.lock().unwrap().unwrap();
        assert_eq!(event.viewport, Viewport::new(100.0, 50.0));
        assert_eq!((event.x, event.y), (10.0, 20.0));
    }
}
