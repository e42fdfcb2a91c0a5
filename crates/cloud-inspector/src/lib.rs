// src/lib.rs
//! Point-cloud inspection engine.
//!
//! Loads an ASCII PLY cloud, keeps a movable camera, and resolves viewport
//! pixels to individual cloud points for a two-point measuring tool. The
//! rendering backend stays behind [`frame::RenderBackend`].

pub mod app;
pub mod camera;
pub mod config;
pub mod data;
pub mod frame;
pub mod input;
pub mod observers;
pub mod picker;
pub mod projector;
