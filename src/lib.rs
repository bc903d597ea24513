//! Deepdome library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive a session without a window or GPU.

pub mod shared;
pub mod config;
pub mod input;
pub mod world;
pub mod mining;
pub mod economy;
pub mod defense;
pub mod session;
pub mod save;
