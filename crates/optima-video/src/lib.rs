//! Scene timing for Optima's script-to-video feature.
//!
//! [`calculate_scene_breaks`] turns a narration script into sentence-aligned
//! scenes before per-scene voice-over is generated; the reveal helpers time
//! on-screen text within one scene. Everything here is pure and stateless.
//!
//! ```
//! use optima_video::calculate_scene_breaks;
//!
//! let scenes = calculate_scene_breaks("One. Two. Three. Four.", 20.0);
//! assert_eq!(scenes.len(), 2);
//! assert!(scenes.iter().all(|scene| scene.duration_seconds >= 5.0));
//! ```

pub mod config;
pub mod reveal;
pub mod scenes;

pub use config::{TimingConfig, TimingError};
pub use reveal::{
    TextReveal, calculate_text_reveals, calculate_word_reveals, text_reveals_with,
    word_reveals_with,
};
pub use scenes::{SceneBreak, ScenePlan, calculate_scene_breaks, plan_scenes};
