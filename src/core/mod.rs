//! Core types and utilities shared by the terrain modules

pub mod types;
pub mod error;
pub mod logging;
pub mod color;
pub mod time;

pub use types::*;
pub use error::Error;
pub use color::{Lerp, Rgba};
