//! # Shape Loading
//!
//! Morph targets are fetched off the render thread. Each fetch runs on its own
//! worker thread and reports back over a channel; the owner picks the result
//! up with a non-blocking [`ShapeLoad::poll`] from inside its frame callback.
//!
//! Cancellation is cooperative: a shared [`CancelToken`] is checked by the
//! worker before it reports and by the owner before it applies a result.

use crate::errors::LoadError;
use crate::mesh;
use crate::obj;
use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, instrument};

/// A named, immutable flat list of `x, y, z` point coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub key: String,
    pub vertices: Arc<[f32]>,
}

impl Shape {
    pub fn new(key: impl Into<String>, vertices: Vec<f32>) -> Self {
        Self {
            key: key.into(),
            vertices: vertices.into(),
        }
    }

    /// Number of complete points.
    pub fn point_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Ordered morph targets; the index is the public morph target id.
pub type ShapeSet = Vec<Shape>;

/// Resolves a resource identifier into a flat vertex list.
///
/// Called from worker threads, so implementations may block.
pub trait ShapeSource: Send + Sync {
    fn fetch(&self, key: &str) -> Result<Vec<f32>, LoadError>;
}

/// Reads Wavefront OBJ files from the local filesystem.
///
/// Paths are tried as given, then relative to `assets/`.
#[derive(Clone, Debug, Default)]
pub struct ObjFileSource;

impl ObjFileSource {
    fn read_text(&self, key: &str) -> Result<String> {
        if let Ok(text) = std::fs::read_to_string(key) {
            return Ok(text);
        }
        let alt = Path::new("assets").join(key);
        std::fs::read_to_string(&alt)
            .with_context(|| format!("checked '{}' and '{}'", key, alt.display()))
    }
}

impl ShapeSource for ObjFileSource {
    #[instrument(level = "debug", skip(self), fields(key = key))]
    fn fetch(&self, key: &str) -> Result<Vec<f32>, LoadError> {
        let text = self
            .read_text(key)
            .map_err(|e| LoadError::unavailable(key, format!("{:#}", e)))?;
        let vertices = obj::parse_positions(&text);
        if vertices.is_empty() {
            return Err(LoadError::NoGeometry {
                key: key.to_string(),
            });
        }
        Ok(vertices)
    }
}

/// Serves vertex lists registered in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    shapes: HashMap<String, Vec<f32>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(mut self, key: impl Into<String>, vertices: Vec<f32>) -> Self {
        self.insert(key, vertices);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, vertices: Vec<f32>) {
        self.shapes.insert(key.into(), vertices);
    }

    /// The procedural solids, keyed by name, scaled to `radius`.
    pub fn builtin(radius: f32) -> Self {
        Self::new()
            .with_shape("tetrahedron", mesh::tetrahedron(radius))
            .with_shape("octahedron", mesh::octahedron(radius))
            .with_shape("cube", mesh::cube(radius / 3.0_f32.sqrt()))
            .with_shape("icosahedron", mesh::icosahedron(radius))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }
}

impl ShapeSource for MemorySource {
    fn fetch(&self, key: &str) -> Result<Vec<f32>, LoadError> {
        match self.shapes.get(key) {
            Some(vertices) if vertices.is_empty() => Err(LoadError::NoGeometry {
                key: key.to_string(),
            }),
            Some(vertices) => Ok(vertices.clone()),
            None => Err(LoadError::unavailable(key, "not registered")),
        }
    }
}

/// Shared flag that turns outstanding loads into no-ops.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a non-blocking poll.
#[derive(Debug, PartialEq)]
pub enum LoadPoll<T> {
    Pending,
    Ready(T),
    Failed(LoadError),
    /// The load was cancelled; its result (if any) has been discarded.
    Cancelled,
}

/// One in-flight shape fetch.
#[derive(Debug)]
pub struct ShapeLoad {
    key: String,
    rx: Receiver<Result<Shape, LoadError>>,
    cancel: CancelToken,
}

/// Starts fetching `key` on a worker thread.
pub fn load_shape(source: Arc<dyn ShapeSource>, key: &str, cancel: CancelToken) -> ShapeLoad {
    let (tx, rx) = bounded(1);
    let worker_key = key.to_string();
    let worker_cancel = cancel.clone();

    thread::spawn(move || {
        let result = source
            .fetch(&worker_key)
            .map(|vertices| Shape::new(worker_key.clone(), vertices));
        if worker_cancel.is_cancelled() {
            debug!(key = %worker_key, "Discarding shape load after cancellation");
            return;
        }
        // The receiver is gone when the owner was dropped; nothing to report to.
        let _ = tx.send(result);
    });

    ShapeLoad {
        key: key.to_string(),
        rx,
        cancel,
    }
}

impl ShapeLoad {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Checks for a result without blocking.
    pub fn poll(&self) -> LoadPoll<Shape> {
        if self.cancel.is_cancelled() {
            return LoadPoll::Cancelled;
        }
        match self.rx.try_recv() {
            Ok(Ok(shape)) => LoadPoll::Ready(shape),
            Ok(Err(e)) => LoadPoll::Failed(e),
            Err(TryRecvError::Empty) => LoadPoll::Pending,
            Err(TryRecvError::Disconnected) => self.disconnected(),
        }
    }

    /// Blocks until the worker reports.
    pub fn wait(self) -> LoadPoll<Shape> {
        let result = self.rx.recv();
        if self.cancel.is_cancelled() {
            return LoadPoll::Cancelled;
        }
        match result {
            Ok(Ok(shape)) => LoadPoll::Ready(shape),
            Ok(Err(e)) => LoadPoll::Failed(e),
            Err(_) => self.disconnected(),
        }
    }

    fn disconnected(&self) -> LoadPoll<Shape> {
        if self.cancel.is_cancelled() {
            LoadPoll::Cancelled
        } else {
            LoadPoll::Failed(LoadError::unavailable(&self.key, "loader exited without a result"))
        }
    }
}

/// All-or-nothing load of an ordered list of shapes.
///
/// Resolves to the full [`ShapeSet`] in request order once every fetch has
/// succeeded; the first failure fails the whole set.
#[derive(Debug)]
pub struct ShapeSetLoad {
    loads: Vec<ShapeLoad>,
    done: Vec<Option<Shape>>,
    cancel: CancelToken,
    finished: bool,
}

/// Starts fetching every key concurrently.
pub fn load_shapes(
    source: Arc<dyn ShapeSource>,
    keys: &[String],
    cancel: CancelToken,
) -> ShapeSetLoad {
    let loads: Vec<ShapeLoad> = keys
        .iter()
        .map(|key| load_shape(Arc::clone(&source), key, cancel.clone()))
        .collect();
    ShapeSetLoad {
        done: vec![None; loads.len()],
        loads,
        cancel,
        finished: false,
    }
}

impl ShapeSetLoad {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Collects finished fetches without blocking.
    ///
    /// Returns `Ready` or `Failed` exactly once; later polls report `Cancelled`.
    pub fn poll(&mut self) -> LoadPoll<ShapeSet> {
        if self.finished || self.cancel.is_cancelled() {
            return LoadPoll::Cancelled;
        }

        for (slot, load) in self.done.iter_mut().zip(&self.loads) {
            if slot.is_some() {
                continue;
            }
            match load.poll() {
                LoadPoll::Ready(shape) => *slot = Some(shape),
                LoadPoll::Pending => {}
                LoadPoll::Failed(e) => {
                    self.finished = true;
                    return LoadPoll::Failed(e);
                }
                LoadPoll::Cancelled => return LoadPoll::Cancelled,
            }
        }

        if self.done.iter().all(Option::is_some) {
            self.finished = true;
            LoadPoll::Ready(self.done.iter_mut().filter_map(Option::take).collect())
        } else {
            LoadPoll::Pending
        }
    }

    /// Blocks until the set resolves.
    pub fn wait(self) -> LoadPoll<ShapeSet> {
        let mut shapes = Vec::with_capacity(self.loads.len());
        for (slot, load) in self.done.into_iter().zip(self.loads) {
            if let Some(shape) = slot {
                shapes.push(shape);
                continue;
            }
            match load.wait() {
                LoadPoll::Ready(shape) => shapes.push(shape),
                LoadPoll::Failed(e) => return LoadPoll::Failed(e),
                LoadPoll::Pending | LoadPoll::Cancelled => return LoadPoll::Cancelled,
            }
        }
        LoadPoll::Ready(shapes)
    }
}
