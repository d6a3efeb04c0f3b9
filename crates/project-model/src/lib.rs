//! Reframe Project Model
//!
//! Defines the core data contracts for Reframe:
//! - **Geometry:** Normalized points/rects and viewport containment math
//! - **Easing:** Interpolation curves, including analytic springs
//! - **Events:** Typed input streams recorded during a capture session
//! - **Tracks:** Camera, cursor, and keystroke edit tracks produced by the director
//!
//! All coordinates are normalized to the `[0.0, 1.0]` range with the origin
//! at the bottom-left of the capture region, so decisions survive DPI and
//! resolution changes across sessions.

pub mod easing;
pub mod event;
pub mod geometry;
pub mod track;

pub use easing::*;
pub use event::*;
pub use geometry::*;
pub use track::*;
