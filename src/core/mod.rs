// src/core/mod.rs
pub mod actuator;
pub mod attendance;
pub mod gallery;
pub mod matching;
pub mod recognition;
pub mod services;
