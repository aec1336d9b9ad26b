//! Scene building and drawing helpers for the collision demo.

use macroquad::models::{Mesh, Vertex, draw_mesh};
use macroquad::prelude::*;
use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Vector2, Vector3};
use sphere_collide::{MeshData, Platformer, PlatformerInput, Triangle};

/// Where the player starts and respawns.
pub fn spawn_point() -> Point3<f32> {
    Point3::new(10.0, 60.0, 25.0)
}

/// Converts a nalgebra point to a macroquad vector.
pub fn to_vec3(p: &Point3<f32>) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

/// Flat-shades `base` by how directly `normal` faces a fixed overhead light.
pub fn shade(base: Color, normal: &Vector3<f32>) -> Color {
    let light = Vector3::new(0.4, 1.0, 0.25).normalize();
    let k = 0.35 + 0.65 * normal.dot(&light).max(0.0);
    Color::new(base.r * k, base.g * k, base.b * k, base.a)
}

/// Draws triangles as flat-shaded meshes.
///
/// Triangles are batched so each mesh stays within 16-bit indices.
pub fn draw_triangles(triangles: &[Triangle], base: Color) {
    const BATCH: usize = u16::MAX as usize / 3;

    for chunk in triangles.chunks(BATCH) {
        let mut vertices = Vec::with_capacity(chunk.len() * 3);
        for triangle in chunk {
            let color = shade(base, &triangle.normal());
            vertices.extend(
                triangle
                    .vertices()
                    .iter()
                    .map(|p| Vertex::new2(to_vec3(p), vec2(0.0, 0.0), color)),
            );
        }

        let indices = (0..vertices.len() as u16).collect();
        let mesh = Mesh {
            vertices,
            indices,
            texture: None,
        };

        draw_mesh(&mesh);
    }
}

/// Generates the 12 triangles of an axis-aligned box, all facing outward.
pub fn box_positions(center: Point3<f32>, half: Vector3<f32>) -> Vec<Point3<f32>> {
    let corners = [
        center + Vector3::new(-half.x, -half.y, -half.z), // 0: left-bottom-back
        center + Vector3::new(half.x, -half.y, -half.z),  // 1: right-bottom-back
        center + Vector3::new(half.x, half.y, -half.z),   // 2: right-top-back
        center + Vector3::new(-half.x, half.y, -half.z),  // 3: left-top-back
        center + Vector3::new(-half.x, -half.y, half.z),  // 4: left-bottom-front
        center + Vector3::new(half.x, -half.y, half.z),   // 5: right-bottom-front
        center + Vector3::new(half.x, half.y, half.z),    // 6: right-top-front
        center + Vector3::new(-half.x, half.y, half.z),   // 7: left-top-front
    ];

    // Counter-clockwise viewed from outside; each quad is split clockwise below.
    let faces: [[usize; 4]; 6] = [
        [4, 5, 6, 7], // front (+Z)
        [1, 0, 3, 2], // back (-Z)
        [0, 4, 7, 3], // left (-X)
        [5, 1, 2, 6], // right (+X)
        [7, 6, 2, 3], // top (+Y)
        [0, 1, 5, 4], // bottom (-Y)
    ];

    faces
        .iter()
        .flat_map(|&[a, b, c, d]| {
            [
                corners[a], corners[c], corners[b],
                corners[a], corners[d], corners[c],
            ]
        })
        .collect()
}

/// An axis-aligned box as unindexed mesh data.
pub fn box_mesh(center: Point3<f32>, half: Vector3<f32>) -> MeshData {
    MeshData::unindexed(box_positions(center, half))
}

/// A box tilted about the Z axis by `angle` radians, for walkable slopes.
pub fn ramp_mesh(center: Point3<f32>, half: Vector3<f32>, angle: f32) -> MeshData {
    let placement = Translation3::from(center.coords).to_homogeneous()
        * Rotation3::from_axis_angle(&Vector3::z_axis(), angle).to_homogeneous();
    box_mesh(Point3::origin(), half).transformed(&placement)
}

/// Generates the static level: a ground slab, a ramp, a staircase, a wall and an overhang.
pub fn demo_level() -> MeshData {
    let mut level = box_mesh(Point3::new(0.0, -10.0, 0.0), Vector3::new(200.0, 10.0, 200.0));

    level.append(&ramp_mesh(
        Point3::new(120.0, 8.0, -60.0),
        Vector3::new(60.0, 4.0, 30.0),
        0.3,
    ));

    for step in 0..6 {
        let height = 5.0 * (step + 1) as f32;
        level.append(&box_mesh(
            Point3::new(-60.0 - step as f32 * 16.0, height / 2.0, 90.0),
            Vector3::new(8.0, height / 2.0, 30.0),
        ));
    }

    level.append(&box_mesh(Point3::new(0.0, 20.0, -150.0), Vector3::new(100.0, 20.0, 6.0)));
    level.append(&box_mesh(Point3::new(70.0, 30.0, 100.0), Vector3::new(30.0, 3.0, 30.0)));

    level
}

/// The moving platform, in its own local space.
pub fn platform_mesh() -> MeshData {
    box_mesh(Point3::origin(), Vector3::new(25.0, 3.0, 25.0))
}

/// Where the moving platform is at `time` seconds: bobbing and slowly turning.
pub fn platform_pose(time: f32) -> Matrix4<f32> {
    let height = 30.0 + 20.0 * (time * 0.8).sin();
    Translation3::new(-100.0, height, -60.0).to_homogeneous()
        * Rotation3::from_axis_angle(&Vector3::y_axis(), time * 0.5).to_homogeneous()
}

/// Reads keyboard and mouse into platformer input.
///
/// Holding the left mouse button moves toward the cursor relative to the
/// screen centre; otherwise WASD moves. Space jumps.
pub fn read_input() -> PlatformerInput {
    let mut direction = Vector2::zeros();

    if is_mouse_button_down(MouseButton::Left) {
        let (mx, my) = mouse_position();
        direction.x = mx - screen_width() / 2.0;
        direction.y = screen_height() / 2.0 - my;
    } else {
        if is_key_down(KeyCode::D) {
            direction.x += 1.0;
        }
        if is_key_down(KeyCode::A) {
            direction.x -= 1.0;
        }
        if is_key_down(KeyCode::W) {
            direction.y += 1.0;
        }
        if is_key_down(KeyCode::S) {
            direction.y -= 1.0;
        }
    }

    PlatformerInput {
        direction: (direction.norm() > f32::EPSILON).then_some(direction),
        jump: is_key_down(KeyCode::Space),
    }
}

/// Draws the player sphere with a rolling spoke and a heading marker.
pub fn draw_actor(platformer: &Platformer<'_>, color: Color) {
    let radius = platformer.config().collision_radius;
    let center = platformer.position();

    draw_sphere_wires(to_vec3(&center), radius, None, color);

    let spoke = platformer
        .world_transform(radius, &Vector3::zeros())
        .transform_point(&Point3::new(0.0, 1.0, 0.0));
    draw_line_3d(to_vec3(&center), to_vec3(&spoke), YELLOW);

    let heading = center + platformer.facing().forward * (radius * 1.5);
    draw_line_3d(to_vec3(&center), to_vec3(&heading), ORANGE);
}

/// Draws the diagnostics overlay.
pub fn draw_hud(platformer: &Platformer<'_>, triangle_count: usize) {
    let stats = platformer.last_stats();

    draw_text(
        &format!(
            "Tested {} of {} triangle(s), in {} loop(s)",
            stats.triangles_tested, triangle_count, stats.iterations
        ),
        10.0,
        25.0,
        20.0,
        WHITE,
    );

    let p = platformer.position();
    draw_text(
        &format!(
            "Position ({:.1}, {:.1}, {:.1}) | {}",
            p.x,
            p.y,
            p.z,
            if platformer.on_ground() { "on ground" } else { "airborne" }
        ),
        10.0,
        45.0,
        18.0,
        GRAY,
    );
    draw_text(
        "Press space key to jump | WASD or hold mouse to move | arrows turn camera",
        10.0,
        65.0,
        16.0,
        DARKGRAY,
    );
}

/// Camera that trails the player at an offset it can orbit and zoom.
///
/// The offset doubles as the platformer's notion of "forward", so turning
/// the camera turns the controls with it.
pub struct FollowCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    /// Minimum distance from target
    pub min_distance: f32,
    /// Maximum distance from target
    pub max_distance: f32,
}

impl FollowCamera {
    /// Creates a camera sitting at `offset` from its target.
    pub fn from_offset(offset: &Vector3<f32>) -> Self {
        let distance = offset.norm().max(f32::EPSILON);
        Self {
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            zoom_speed: 10.0,
            min_distance: 40.0,
            max_distance: 600.0,
        }
    }

    /// Updates camera state from user input (scroll, arrow keys).
    pub fn update(&mut self) {
        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        if is_key_down(KeyCode::Left) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }

        // Keep a horizontal component so the controls stay defined.
        self.pitch = self.pitch.clamp(0.1, 1.4);
    }

    /// Returns the camera position relative to its target.
    pub fn offset(&self) -> Vector3<f32> {
        Vector3::new(
            self.distance * self.pitch.cos() * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.yaw.cos(),
        )
    }

    /// Converts to macroquad's Camera3D looking at `target`.
    pub fn to_camera3d(&self, target: &Point3<f32>) -> Camera3D {
        Camera3D {
            position: to_vec3(&(target + self.offset())),
            up: vec3(0.0, 1.0, 0.0),
            target: to_vec3(target),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sphere_collide::{Collider, PlatformerConfig, StaticTriangleSelector, TriangleSelector};

    #[test]
    fn box_faces_point_outward() {
        let center = Point3::new(1.0, 2.0, 3.0);
        let triangles = box_mesh(center, Vector3::new(4.0, 1.0, 2.0)).triangles().unwrap();

        assert_eq!(triangles.len(), 12);
        for t in &triangles {
            assert!(t.normal().dot(&(t.centroid() - center)) > 0.0);
        }
    }

    #[test]
    fn ramp_top_is_walkable() {
        let ramp = ramp_mesh(Point3::origin(), Vector3::new(60.0, 4.0, 30.0), 0.3);
        let steepest_top = ramp
            .triangles()
            .unwrap()
            .iter()
            .map(|t| t.normal().y)
            .fold(f32::MIN, f32::max);

        assert_relative_eq!(steepest_top, 0.3f32.cos(), epsilon = 1e-5);
        assert!(steepest_top > PlatformerConfig::default().ground_slope);
    }

    #[test]
    fn follow_camera_reproduces_offset() {
        let offset = Vector3::new(0.0, 200.0, 200.0);
        let camera = FollowCamera::from_offset(&offset);
        assert_relative_eq!(camera.offset(), offset, epsilon = 1e-3);
    }

    #[test]
    fn platform_pose_bobs_around_its_rest_height() {
        let at_rest = platform_pose(0.0);
        assert_relative_eq!(at_rest.transform_point(&Point3::origin()), Point3::new(-100.0, 30.0, -60.0));
    }

    #[test]
    fn player_lands_in_demo_level() {
        let level = StaticTriangleSelector::from_mesh(&Matrix4::identity(), &demo_level(), 16).unwrap();
        assert_eq!(level.count(), 12 * 10);

        let mut collider = Collider::new();
        collider.add_selector(level);
        let mut platformer = Platformer::new(collider, PlatformerConfig::default(), spawn_point());

        for _ in 0..300 {
            platformer.update(1.0 / 60.0);
        }

        assert!(platformer.on_ground());
        assert_relative_eq!(platformer.position().y, 7.0, epsilon = 1e-3);
    }
}
