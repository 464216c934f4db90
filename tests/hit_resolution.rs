use glam::Vec3;
use kestrel_xr::camera3d::Camera3D;
use kestrel_xr::config::XrConfig;
use kestrel_xr::events::{ClickState, EventCategories, EventDelegate};
use kestrel_xr::hit::hit_test;
use kestrel_xr::time::ManualClock;
use kestrel_xr::{InputController, NodeBounds, SceneGraph};
use std::rc::Rc;

struct Silent;
impl EventDelegate for Silent {}

fn sphere(scene: &mut SceneGraph, position: Vec3, radius: f32) -> kestrel_xr::NodeId {
    let node = scene.add_node(scene.root(), position).expect("add node");
    scene.set_bounds(node, Some(NodeBounds::Sphere { radius }));
    node
}

#[test]
fn nearest_interactable_node_wins() {
    let mut scene = SceneGraph::new();
    let near = sphere(&mut scene, Vec3::new(0.0, 0.0, -2.0), 0.5);
    let far = sphere(&mut scene, Vec3::new(0.0, 0.0, -6.0), 0.5);
    let camera = Camera3D::default();

    let hit = hit_test(&scene, &camera, Vec3::ZERO, Vec3::NEG_Z, true, 8.0);
    assert_eq!(hit.node(), near);
    assert!((hit.distance() - 1.5).abs() < 1e-4);

    scene.set_ignore_event_handling(near, true);
    let hit = hit_test(&scene, &camera, Vec3::ZERO, Vec3::NEG_Z, true, 8.0);
    assert_eq!(hit.node(), far, "ignored nodes are skipped, not blocking");
    assert!(!hit.is_background_hit());
}

#[test]
fn miss_falls_back_to_background_on_root() {
    let mut scene = SceneGraph::new();
    sphere(&mut scene, Vec3::new(5.0, 0.0, -2.0), 0.5);
    let hit = hit_test(&scene, &Camera3D::default(), Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, true, 8.0);
    assert!(hit.is_background_hit());
    assert_eq!(hit.node(), scene.root());
    assert_eq!(hit.distance(), 8.0);
    assert!(hit.world_position().distance(Vec3::new(0.0, 1.0, -8.0)) < 1e-5);
}

#[test]
fn hits_past_far_plane_are_dropped() {
    let mut scene = SceneGraph::new();
    sphere(&mut scene, Vec3::new(0.0, 0.0, -50.0), 1.0);
    let camera = Camera3D { far: 10.0, ..Camera3D::default() };
    let hit = hit_test(&scene, &camera, Vec3::ZERO, Vec3::NEG_Z, true, 8.0);
    assert!(hit.is_background_hit());
}

#[test]
fn bounds_only_uses_enclosing_sphere() {
    let mut scene = SceneGraph::new();
    let cube = scene.add_node(scene.root(), Vec3::new(0.0, 0.0, -5.0)).expect("cube");
    scene.set_bounds(cube, Some(NodeBounds::cube(1.0)));
    let camera = Camera3D::default();
    let origin = Vec3::new(1.2, 0.0, 0.0);

    let coarse = hit_test(&scene, &camera, origin, Vec3::NEG_Z, true, 8.0);
    assert_eq!(coarse.node(), cube, "ray passes inside the enclosing sphere");

    let exact = hit_test(&scene, &camera, origin, Vec3::NEG_Z, false, 8.0);
    assert!(exact.is_background_hit(), "ray misses the box itself");
}

#[test]
fn controller_keeps_hit_while_dragging() {
    let mut scene = SceneGraph::new();
    let node = sphere(&mut scene, Vec3::new(0.0, 0.0, -3.0), 0.5);
    let config = XrConfig::default();
    scene.set_handler(node, Some(config.event_handler(Rc::new(Silent), EventCategories::DRAG)));
    let camera = Camera3D::default();
    let mut input = InputController::new(&config, Rc::new(ManualClock::new(0.0)));

    input.update_hit_node(&scene, &camera, Vec3::ZERO, Vec3::NEG_Z);
    input.on_button(&mut scene, 0, ClickState::ClickDown);
    input.update_hit_node(&scene, &camera, Vec3::ZERO, Vec3::Y);
    assert_eq!(input.hit_result().map(|hit| hit.node()), Some(node), "hit frozen during drag");

    input.on_button(&mut scene, 0, ClickState::ClickUp);
    input.update_hit_node(&scene, &camera, Vec3::ZERO, Vec3::Y);
    assert!(input.hit_result().is_some_and(|hit| hit.is_background_hit()));
}

#[test]
fn configured_background_distance_is_used() {
    let config: XrConfig =
        serde_json::from_str(r#"{"interaction":{"background_distance":3.0}}"#).expect("parse config");
    let scene = SceneGraph::new();
    let mut input = InputController::new(&config, Rc::new(ManualClock::new(0.0)));
    input.update_hit_node(&scene, &Camera3D::default(), Vec3::ZERO, Vec3::NEG_Z);
    let hit = input.hit_result().copied().expect("hit cached");
    assert_eq!(hit.distance(), 3.0);
}

#[test]
fn background_point_scales_unnormalized_ray() {
    let scene = SceneGraph::new();
    let hit = hit_test(&scene, &Camera3D::default(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -2.0), true, 8.0);
    assert!(hit.is_background_hit());
    assert!(
        hit.world_position().distance(Vec3::new(1.0, 0.0, -16.0)) < 1e-5,
        "background sits at origin + ray * distance, got {}",
        hit.world_position()
    );
}
