//! Sphere-based platformer character.

use log::{debug, warn};
use nalgebra::{Matrix4, Point3, Rotation3, Vector2, Vector3};

use crate::{Collider, CollisionStats};

use super::{Basis, PlatformerConfig};

/// Default camera offset from the character: above and behind.
fn default_offset() -> Vector3<f32> {
    Vector3::new(0.0, 200.0, 200.0)
}

/// One frame of player intent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlatformerInput {
    /// Screen-space direction: `x` to the right, `y` away from the camera.
    ///
    /// Scaled to unit length before use; a zero vector means no movement.
    pub direction: Option<Vector2<f32>>,
    /// Whether the jump control is held this frame.
    pub jump: bool,
}

/// State touched by the contact handler while the collider runs.
#[derive(Debug, Clone)]
struct Body {
    position: Point3<f32>,
    velocity: Vector3<f32>,
    ground_normal: Vector3<f32>,
    on_ground: bool,
    jump: f32,
}

impl Body {
    fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            velocity: Vector3::zeros(),
            ground_normal: Vector3::zeros(),
            on_ground: false,
            jump: 0.0,
        }
    }

    /// Classifies a contact normal as ground, ceiling or wall.
    ///
    /// Ground stops the fall and contributes to the ground normal. Ceiling
    /// stops the rise and cancels the remaining jump energy. Walls only
    /// push the sphere, which the collider has already done.
    fn absorb_contact(&mut self, normal: Vector3<f32>, ground_slope: f32) {
        if normal.y > ground_slope {
            self.on_ground = true;
            self.velocity.y = 0.0;
            self.ground_normal += normal;
        } else if normal.y < -ground_slope {
            self.velocity.y = 0.0;
            self.jump = 0.0;
        }
    }
}

/// A sphere that walks, falls and jumps through collider geometry.
///
/// Each [`update`](Platformer::update) integrates velocity, moves the sphere,
/// resolves it against the collider and classifies the contacts. While
/// grounded, movement is expressed in a frame aligned with the averaged
/// ground normal so the sphere follows slopes instead of skipping off them.
pub struct Platformer<'a> {
    collider: Collider<'a>,
    config: PlatformerConfig,
    body: Body,
    offset: Vector3<f32>,
    orientation: Basis,
    facing: Basis,
    angle: f32,
    jump_held: bool,
    last_stats: CollisionStats,
}

impl<'a> Platformer<'a> {
    /// Creates a platformer at `position`, at rest and airborne.
    pub fn new(collider: Collider<'a>, config: PlatformerConfig, position: Point3<f32>) -> Self {
        Self {
            collider,
            config,
            body: Body::at(position),
            offset: default_offset(),
            orientation: Basis::identity(),
            facing: Basis::identity(),
            angle: 0.0,
            jump_held: false,
            last_stats: CollisionStats::default(),
        }
    }

    /// Returns the collider the character moves through.
    pub fn collider(&self) -> &Collider<'a> {
        &self.collider
    }

    /// Returns the collider mutably, to add or replace selectors.
    pub fn collider_mut(&mut self) -> &mut Collider<'a> {
        &mut self.collider
    }

    /// Returns the tuning values.
    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    /// Returns the tuning values mutably; changes apply from the next update.
    pub fn config_mut(&mut self) -> &mut PlatformerConfig {
        &mut self.config
    }

    /// Returns the sphere centre.
    pub fn position(&self) -> Point3<f32> {
        self.body.position
    }

    /// Moves the sphere centre without touching velocity or contact state.
    pub fn set_position(&mut self, position: Point3<f32>) {
        self.body.position = position;
    }

    /// Returns the current velocity, in units per second.
    pub fn velocity(&self) -> Vector3<f32> {
        self.body.velocity
    }

    /// Overrides the current velocity.
    pub fn set_velocity(&mut self, velocity: Vector3<f32>) {
        self.body.velocity = velocity;
    }

    /// Sum of the ground contact normals found in the last update.
    pub fn ground_normal(&self) -> Vector3<f32> {
        self.body.ground_normal
    }

    /// Whether the last update found a ground contact.
    pub fn on_ground(&self) -> bool {
        self.body.on_ground
    }

    /// Remaining jump energy.
    pub fn jump(&self) -> f32 {
        self.body.jump
    }

    /// Visual roll angle in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Camera offset from the character. Its horizontal part defines "forward" for input.
    pub fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    /// Sets the camera offset used to map input directions.
    pub fn set_offset(&mut self, offset: Vector3<f32>) {
        self.offset = offset;
    }

    /// Movement frame aligned with the ground (identity while airborne).
    pub fn orientation(&self) -> &Basis {
        &self.orientation
    }

    /// Upright frame facing the last horizontal direction of travel.
    pub fn facing(&self) -> &Basis {
        &self.facing
    }

    /// Collider diagnostics from the last update.
    pub fn last_stats(&self) -> CollisionStats {
        self.last_stats
    }

    /// Puts the character back at `position` at rest, airborne and unrotated.
    pub fn reset(&mut self, position: Point3<f32>) {
        self.body = Body::at(position);
        self.orientation = Basis::identity();
        self.facing = Basis::identity();
        self.angle = 0.0;
        self.jump_held = false;
    }

    /// Turns player intent into velocity.
    ///
    /// A jump starts on the frame the jump control goes down while grounded.
    /// Lateral velocity is replaced every call, using the air speed when not
    /// on the ground.
    pub fn apply_input(&mut self, input: &PlatformerInput) {
        if self.config.jump_enabled {
            if input.jump && !self.jump_held && self.body.on_ground {
                self.jump_held = true;
                self.body.jump = self.config.jump_height;
                self.body.velocity.y = 0.0;
                self.body.on_ground = false;
                debug!("jump started at {:?}", self.body.position);
            } else if !input.jump {
                self.jump_held = false;
            }
        }

        let speed = if self.body.on_ground {
            self.config.horizontal_speed
        } else {
            self.config.air_horizontal_speed
        };

        self.body.velocity.x = 0.0;
        self.body.velocity.z = 0.0;

        let Some(direction) = input.direction.and_then(|d| d.try_normalize(f32::EPSILON)) else {
            return;
        };
        let Some(forward) = Vector3::new(self.offset.x, 0.0, self.offset.z).try_normalize(f32::EPSILON)
        else {
            return;
        };
        let right = forward.cross(&Vector3::y()).normalize();

        self.body.velocity -= right * (direction.x * speed) + forward * (direction.y * speed);
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Non-positive steps are ignored.
    pub fn update(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            warn!("ignoring platformer update with dt = {}", dt);
            return;
        }

        let config = &self.config;
        let body = &mut self.body;

        if body.on_ground {
            body.velocity.y = config.ground_stick / dt;
        } else {
            body.velocity.y = (body.velocity.y - config.gravity + body.jump).max(-config.max_fall_speed);
            body.jump = (body.jump - config.jump_decay).max(0.0);
        }

        let mut step = body.velocity * dt;
        let max_step = config.max_step();
        if step.norm() > max_step {
            step = step.normalize() * max_step;
        }
        body.position += self.orientation.transform_vector(&step);

        let was_on_ground = body.on_ground;
        body.on_ground = false;
        body.ground_normal = Vector3::zeros();
        self.orientation = Basis::identity();

        let ground_slope = config.ground_slope;
        let mut position = body.position;
        self.last_stats = self.collider.collide_with_iterations(
            &mut position,
            config.collision_radius,
            config.max_iterations,
            |contact| {
                body.absorb_contact(contact.normal(), ground_slope);
                true
            },
        );
        body.position = position;

        if body.on_ground {
            if !was_on_ground {
                debug!("landed at {:?}", body.position);
            }
            if let Some(basis) = Basis::from_ground_normal(&body.ground_normal) {
                self.orientation = basis;
            }
        }

        if let Some(basis) = Basis::facing(&body.velocity) {
            self.facing = basis;
            self.angle = wrap_degrees(self.angle + config.angular_velocity * dt);
        }
    }

    /// Builds the model matrix for drawing the character.
    ///
    /// The model is first moved by `zero_translation` (to centre it on its
    /// origin), rolled by [`angle`](Platformer::angle) about its local X axis,
    /// turned to the facing direction, scaled and finally placed at the
    /// character's position.
    pub fn world_transform(&self, scale: f32, zero_translation: &Vector3<f32>) -> Matrix4<f32> {
        let roll = Rotation3::from_axis_angle(&Vector3::x_axis(), self.angle.to_radians());

        Matrix4::new_translation(&self.body.position.coords)
            * Matrix4::new_scaling(scale)
            * self.facing.to_matrix()
            * roll.to_homogeneous()
            * Matrix4::new_translation(zero_translation)
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    if angle < 0.0 {
        angle + 360.0
    } else if angle >= 360.0 {
        angle - 360.0
    } else {
        angle
    }
}
