//! Character controllers driven by the [`Collider`](crate::Collider).
//!
//! # Example
//!
//! ```ignore
//! use sphere_collide::{Collider, Platformer, PlatformerConfig, PlatformerInput};
//!
//! let mut collider = Collider::new();
//! collider.add_selector(level);
//!
//! let mut player = Platformer::new(collider, PlatformerConfig::default(), spawn);
//! loop {
//!     player.apply_input(&PlatformerInput { direction, jump });
//!     player.update(dt);
//! }
//! ```

mod basis;
mod config;
mod platformer;

pub use basis::Basis;
pub use config::PlatformerConfig;
pub use platformer::{Platformer, PlatformerInput};
