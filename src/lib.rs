//! Sightline — gaze estimation and interaction engine for hands-free
//! reading.
//!
//! Converts per-frame eye poses into a stable on-screen focus point,
//! detects blink gestures from eyelid-closure signals, and turns sustained
//! edge-zone gaze into debounced scroll commands. The document viewer,
//! renderer, and face tracker are external collaborators; this library
//! exposes the engine modules for them and for integration testing. The
//! demo entry point lives in `main.rs`.

pub mod blink;
pub mod clock;
pub mod config;
pub mod engine;
pub mod math;
pub mod ray;
pub mod sample;
pub mod scroll;
pub mod smoother;
