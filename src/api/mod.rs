// src/api/mod.rs
pub mod handlers;
pub mod rest;
pub mod types;

pub use rest::{configure, ApiServices};
