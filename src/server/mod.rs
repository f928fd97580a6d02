//! Server module for building the HTTP surface
//!
//! This module provides a `ServerBuilder` that wires the injected store into
//! the resource handlers and adds health and tracing layers.

pub mod builder;
pub mod router;

pub use builder::ServerBuilder;
