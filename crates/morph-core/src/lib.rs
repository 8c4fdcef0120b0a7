//! # Morph Core
//!
//! `morph-core` drives a small real-time 3D scene: a single mesh that morphs
//! between several loaded target shapes and tilts toward the pointer, in front
//! of a field of slowly tumbling background solids.
//!
//! ## Core Features
//!
//! *   **Asynchronous Loading**: Target shapes are fetched on worker threads and
//!     activate all at once; a single failure keeps the engine inactive.
//! *   **Canonical Buffer**: Shapes of different resolution share one vertex
//!     buffer sized by the largest shape; missing coordinates blend toward the origin.
//! *   **Eased Timeline**: `morph_to(index)` eases a continuous progress value
//!     toward the target and restarts smoothly mid-flight.
//! *   **Pointer Parallax**: Smoothed pointer offsets rotate the mesh group and the camera.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use morph_core::{HostConfig, MemorySource, Morpher, MorpherConfig, RenderHost};
//! use std::sync::Arc;
//!
//! let mut host = RenderHost::new(HostConfig::default());
//! let morpher = Morpher::new(
//!     &mut host,
//!     Arc::new(MemorySource::builtin(1.0)),
//!     MorpherConfig {
//!         sources: vec!["tetrahedron".into(), "octahedron".into()],
//!         ..MorpherConfig::default()
//!     },
//! );
//!
//! // Drive frames; once the shapes are in, start a transition.
//! host.step();
//! morpher.morph_to(1);
//! ```

/// Easing curves and interpolation helpers.
pub mod animation;

/// Background field of spinning solids.
pub mod background;

/// Canonical vertex buffer construction.
pub mod buffer;

/// Progress-driven geometry blending.
pub mod blend;

/// Scene description files.
pub mod config;

pub mod errors;

/// Headless render loop, camera and event dispatch.
pub mod host;

/// Mesh data and procedural solids.
pub mod mesh;

/// The morphing engine.
pub mod morpher;

pub mod obj;

/// Pointer smoothing and parallax transforms.
pub mod parallax;

/// The Scene Graph Data Structure.
pub mod scene;

/// Shape sources and cancellable loading.
pub mod shape;

/// Restartable eased morph transitions.
pub mod timeline;

/// Shared data structures used across the engine.
pub mod types;

pub use background::{BackgroundConfig, BackgroundField};
pub use config::SceneConfig;
pub use errors::LoadError;
pub use host::{FrameContext, HostConfig, RenderHost, Subscription};
pub use morpher::{Morpher, MorpherConfig, MorpherStatus};
pub use shape::{MemorySource, ObjFileSource, Shape, ShapeSet, ShapeSource};
