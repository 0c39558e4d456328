//! Core types and utilities

pub mod cell;
pub mod extent;
pub mod vec2;

pub use cell::{Cell, Flow, Rgba};
pub use extent::GridExtent;
pub use vec2::Vec2;
