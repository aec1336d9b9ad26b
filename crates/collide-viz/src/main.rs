use std::cell::Cell;

use collide_viz::{
    FollowCamera, demo_level, draw_actor, draw_hud, draw_triangles, platform_mesh, platform_pose,
    read_input, spawn_point,
};
use log::{error, info, warn};
use macroquad::prelude::*;
use nalgebra::Matrix4;
use sphere_collide::{
    Collider, DynamicTriangleSelector, Platformer, PlatformerConfig, StaticTriangleSelector,
};

/// Below this height the player is considered lost and respawns.
const RESPAWN_HEIGHT: f32 = -400.0;

/// Longest frame simulated in one update, so a stall does not launch the player.
const MAX_FRAME_TIME: f32 = 1.0 / 20.0;

/// Loads the platformer config named on the command line, if any.
fn load_config() -> PlatformerConfig {
    let Some(path) = std::env::args().nth(1) else {
        return PlatformerConfig::default();
    };

    match PlatformerConfig::load_from_file(&path) {
        Ok(config) => {
            info!("loaded platformer config from {}", path);
            config
        }
        Err(e) => {
            warn!("could not load {}: {}; using defaults", path, e);
            PlatformerConfig::default()
        }
    }
}

#[macroquad::main("Sphere Collide")]
async fn main() {
    env_logger::init();

    let level = demo_level();
    let level_triangles = match level.triangles() {
        Ok(triangles) => triangles,
        Err(e) => {
            error!("bad level mesh: {}", e);
            return;
        }
    };
    let level_selector = StaticTriangleSelector::from_triangles(level_triangles.clone(), 16);
    info!(
        "level: {} triangles, {} octree nodes, depth {}",
        level_triangles.len(),
        level_selector.node_count(),
        level_selector.depth()
    );

    let platform_transform = Cell::new(platform_pose(0.0));
    let platform_selector = match DynamicTriangleSelector::from_mesh(&platform_transform, &platform_mesh()) {
        Ok(selector) => selector,
        Err(e) => {
            error!("bad platform mesh: {}", e);
            return;
        }
    };
    let platform_triangles = platform_selector.local_triangles().to_vec();

    let mut collider = Collider::new();
    collider.add_selector(level_selector);
    collider.add_selector(platform_selector);

    let mut platformer = Platformer::new(collider, load_config(), spawn_point());
    let triangle_count = platformer.collider().triangle_count();
    let mut camera = FollowCamera::from_offset(&platformer.offset());
    let mut time = 0.0;

    loop {
        let dt = get_frame_time().min(MAX_FRAME_TIME);
        time += dt;
        platform_transform.set(platform_pose(time));

        camera.update();
        platformer.set_offset(camera.offset());
        platformer.apply_input(&read_input());
        platformer.update(dt);

        if platformer.position().y < RESPAWN_HEIGHT {
            info!("fell out of the level, respawning");
            platformer.reset(spawn_point());
        }

        clear_background(Color::from_rgba(20, 20, 30, 255));
        set_camera(&camera.to_camera3d(&platformer.position()));

        draw_triangles(&level_triangles, Color::from_rgba(120, 160, 110, 255));

        let pose: Matrix4<f32> = platform_transform.get();
        let moved: Vec<_> = platform_triangles.iter().map(|t| t.transformed(&pose)).collect();
        draw_triangles(&moved, Color::from_rgba(170, 120, 200, 255));

        draw_actor(&platformer, SKYBLUE);

        set_default_camera();
        draw_hud(&platformer, triangle_count);

        next_frame().await
    }
}
