// src/data/mod.rs
//! Data handling modules for the inspector.
//!
//! This module provides functionality for:
//! - Loading PLY point clouds and preparing them for the GPU.
//! - Defining the plain-old-data layouts handed to a rendering backend.

pub mod point_cloud;
pub mod types;

// Re-export commonly used types for convenience.
pub use self::types::{FrameUniform, MarkerVertex, PointVertex};
