//! Morpher Lifecycle Tests
//!
//! End-to-end behaviour of the morphing engine inside a headless host.

mod common;

use common::*;
use morph_core::{HostConfig, LoadError, MemorySource, Morpher, MorpherStatus, RenderHost};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Morphing to a shape and back walks through intermediate blends and lands exactly.
#[test]
fn morph_round_trip_lands_on_shapes() {
    let mut host = RenderHost::default();
    let morpher = Morpher::new(&mut host, Arc::new(three_shape_source()), config(&["a", "b", "c"]));
    wait_until_loaded(&mut host, &morpher);

    assert_eq!(morpher.status(), MorpherStatus::Ready);
    assert_eq!(morpher.shape_count(), 3);
    assert_eq!(mesh_positions(&host, &morpher), shape_a());

    morpher.morph_to(1);
    run_to_completion(&mut host, &morpher);
    assert_eq!(morpher.progress(), 1.0);
    assert_eq!(mesh_positions(&host, &morpher), shape_b());

    morpher.morph_to(0);
    let (a, b) = (shape_a(), shape_b());
    let mut saw_intermediate = false;
    while morpher.is_animating() {
        host.step();
        let positions = mesh_positions(&host, &morpher);
        if positions != a && positions != b {
            saw_intermediate = true;
            for (i, value) in positions.iter().enumerate() {
                let (lo, hi) = (a[i].min(b[i]), a[i].max(b[i]));
                assert!(
                    (lo - 1e-5..=hi + 1e-5).contains(value),
                    "coordinate {} = {} outside [{}, {}]",
                    i,
                    value,
                    lo,
                    hi
                );
            }
        }
    }

    assert!(saw_intermediate, "no intermediate blend observed");
    assert_eq!(morpher.progress(), 0.0);
    assert_eq!(mesh_positions(&host, &morpher), shape_a());
}

/// Every valid target is reached with no floating drift.
#[test]
fn every_target_is_reached_exactly() {
    let mut host = RenderHost::default();
    let morpher = Morpher::new(&mut host, Arc::new(three_shape_source()), config(&["a", "b", "c"]));
    wait_until_loaded(&mut host, &morpher);

    for index in [2, 0, 1, 2, 1, 0] {
        morpher.morph_to(index);
        run_to_completion(&mut host, &morpher);
        assert_eq!(morpher.progress(), index as f64);
    }
}

/// A second request mid-flight continues from the live value.
#[test]
fn restart_is_continuous() {
    let mut host = RenderHost::default();
    let morpher = Morpher::new(&mut host, Arc::new(three_shape_source()), config(&["a", "b", "c"]));
    wait_until_loaded(&mut host, &morpher);

    morpher.morph_to(2);
    let mut previous = morpher.progress();
    let mut largest_step: f64 = 0.0;
    for _ in 0..20 {
        host.step();
        let progress = morpher.progress();
        largest_step = largest_step.max((progress - previous).abs());
        previous = progress;
    }
    assert!(previous > 0.0 && previous < 2.0);

    let at_restart = morpher.progress();
    morpher.morph_to(1);
    host.step();
    assert_eq!(morpher.progress(), at_restart);

    while morpher.is_animating() {
        host.step();
        let progress = morpher.progress();
        assert!(
            (progress - previous).abs() <= largest_step.max(0.1),
            "jump from {} to {}",
            previous,
            progress
        );
        previous = progress;
    }
    assert_eq!(morpher.progress(), 1.0);
}

/// Out-of-range targets are ignored without side effects.
#[test]
fn out_of_range_target_is_ignored() {
    let mut host = RenderHost::default();
    let morpher = Morpher::new(&mut host, Arc::new(three_shape_source()), config(&["a", "b", "c"]));
    wait_until_loaded(&mut host, &morpher);

    morpher.morph_to(3);
    morpher.morph_to(usize::MAX);
    assert!(!morpher.is_animating());
    for _ in 0..10 {
        host.step();
    }
    assert_eq!(morpher.progress(), 0.0);
    assert_eq!(mesh_positions(&host, &morpher), shape_a());
}

/// Requests made before the shapes arrive are dropped.
#[test]
fn morph_before_load_is_ignored() {
    let mut host = RenderHost::default();
    let (source, gate) = GatedSource::new(three_shape_source());
    let morpher = Morpher::new(&mut host, source, config(&["a", "b", "c"]));

    host.step();
    assert!(morpher.is_loading());
    morpher.morph_to(1);
    assert!(!morpher.is_animating());

    drop(gate);
    wait_until_loaded(&mut host, &morpher);
    for _ in 0..5 {
        host.step();
    }
    assert_eq!(morpher.progress(), 0.0);
    assert!(!morpher.is_animating());
}

/// Destroying while loads are outstanding leaves the scene untouched afterwards.
#[test]
fn destroy_before_load_discards_late_results() {
    let mut host = RenderHost::default();
    let (source, gate) = GatedSource::new(three_shape_source());
    let mut morpher = Morpher::new(&mut host, source, config(&["a", "b", "c"]));

    host.step();
    assert_eq!(host.scene.child_count(host.root), 1);

    morpher.destroy(&mut host);
    let children_after_destroy = host.scene.child_count(host.root);
    let nodes_after_destroy = host.scene.len();
    assert_eq!(children_after_destroy, 0);

    drop(gate);
    thread::sleep(Duration::from_millis(50));
    for _ in 0..10 {
        host.step();
    }

    assert_eq!(host.scene.child_count(host.root), children_after_destroy);
    assert_eq!(host.scene.len(), nodes_after_destroy);
    assert_eq!(morpher.status(), MorpherStatus::Destroyed);
    assert!(morpher.mesh_node().is_none());
    assert_eq!(host.subscriber_count(), 0);
}

/// Destroying mid-transition stops the timeline and is idempotent.
#[test]
fn destroy_during_transition() {
    let mut host = RenderHost::default();
    let mut morpher =
        Morpher::new(&mut host, Arc::new(three_shape_source()), config(&["a", "b", "c"]));
    wait_until_loaded(&mut host, &morpher);

    morpher.morph_to(2);
    for _ in 0..10 {
        host.step();
    }
    let frozen = morpher.progress();

    morpher.destroy(&mut host);
    morpher.destroy(&mut host);
    for _ in 0..100 {
        host.step();
    }

    assert_eq!(morpher.progress(), frozen);
    assert!(!morpher.is_animating());
    assert_eq!(host.scene.child_count(host.root), 0);
    assert_eq!(host.scene.len(), 1);
    assert_eq!(host.subscriber_count(), 0);

    morpher.morph_to(1);
    assert!(!morpher.is_animating());
}

/// Any failed load keeps the engine inactive and reports the error.
#[test]
fn failed_load_is_fatal() {
    let mut host = RenderHost::default();
    let morpher = Morpher::new(&mut host, Arc::new(three_shape_source()), config(&["a", "missing", "c"]));
    wait_until_loaded(&mut host, &morpher);

    match morpher.status() {
        MorpherStatus::Failed(LoadError::ResourceUnavailable { key, .. }) => {
            assert_eq!(key, "missing")
        }
        other => panic!("unexpected status {:?}", other),
    }
    assert!(morpher.mesh_node().is_none());
    assert_eq!(morpher.shape_count(), 0);

    morpher.morph_to(0);
    assert!(!morpher.is_animating());
}

#[test]
fn empty_geometry_is_reported() {
    let mut host = RenderHost::default();
    let source = MemorySource::new().with_shape("a", shape_a()).with_shape("hollow", Vec::new());
    let morpher = Morpher::new(&mut host, Arc::new(source), config(&["a", "hollow"]));
    wait_until_loaded(&mut host, &morpher);

    assert_eq!(
        morpher.load_error(),
        Some(LoadError::NoGeometry {
            key: "hollow".to_string()
        })
    );
}

/// Shapes of different resolution share the largest buffer and zero-fill the rest.
#[test]
fn mixed_resolution_shapes_blend_toward_origin() {
    let small: Vec<f32> = (1..=9).map(|v| v as f32).collect();
    let large: Vec<f32> = (1..=15).map(|v| -(v as f32)).collect();
    let source = MemorySource::new()
        .with_shape("small", small.clone())
        .with_shape("large", large.clone());

    let mut host = RenderHost::default();
    let morpher = Morpher::new(&mut host, Arc::new(source), config(&["small", "large"]));
    wait_until_loaded(&mut host, &morpher);

    let positions = mesh_positions(&host, &morpher);
    assert_eq!(positions.len(), 15);
    assert_eq!(&positions[..9], &small[..]);
    assert!(positions[9..].iter().all(|v| *v == 0.0));

    morpher.morph_to(1);
    run_to_completion(&mut host, &morpher);
    assert_eq!(mesh_positions(&host, &morpher), large);
}

/// The mesh spins a full turn per unit of progress and carries the configured scale.
#[test]
fn mesh_spins_with_progress() {
    let mut host = RenderHost::default();
    let morpher = Morpher::new(&mut host, Arc::new(three_shape_source()), config(&["a", "b", "c"]));
    wait_until_loaded(&mut host, &morpher);

    morpher.morph_to(1);
    run_to_completion(&mut host, &morpher);

    let node = host.scene.get_node(morpher.mesh_node().unwrap()).unwrap();
    assert!((node.transform.rotation.y + std::f32::consts::TAU).abs() < 1e-5);
    assert_eq!(node.transform.scale.x, 2.0);
    assert!(node.mesh().unwrap().needs_update);
}

/// Pointer parallax runs while shapes are still loading and converges without overshoot.
#[test]
fn parallax_converges_before_load() {
    let mut host = RenderHost::new(HostConfig {
        width: 800.0,
        height: 600.0,
        ..HostConfig::default()
    });
    let (source, _gate) = GatedSource::new(three_shape_source());
    let morpher = Morpher::new(&mut host, source, config(&["a", "b", "c"]));

    host.dispatch_pointer_move(800.0, 300.0);
    let parallax = morpher.parallax();
    assert_eq!(parallax.x.target, 1.0);
    assert_eq!(parallax.y.target, 0.0);

    let target_rotation = std::f32::consts::PI * 0.125;
    let mut distance = f64::INFINITY;
    for _ in 0..200 {
        host.step();
        let x = morpher.parallax().x;
        assert!(x.current <= x.target);
        let next = (x.target - x.current).abs();
        if distance > 1e-9 {
            assert!(next < distance);
        }
        distance = next;
    }

    assert!(morpher.is_loading());
    let group = host.scene.get_node(morpher.group_node()).unwrap();
    assert!((group.transform.rotation.y - target_rotation).abs() < 1e-4);
    assert!((group.transform.position.y - 100.0).abs() < 1e-2);
    assert!(host.camera.transform.rotation.y < 0.0);
    assert_eq!(host.camera.transform.rotation.x, 0.0);
}
