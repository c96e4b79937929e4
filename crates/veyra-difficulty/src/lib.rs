//! # Difficulty Controller
//!
//! Keeps block production near the target interval by adjusting the PoW
//! target once per trailing window, bounded to a 4x move per step so a
//! burst of fast or slow blocks can't swing difficulty instantly.

pub mod domain;

pub use domain::{intervals_from_timestamps, DifficultyAdjuster, DifficultyConfig};
