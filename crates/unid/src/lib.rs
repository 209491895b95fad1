#![deny(clippy::all)]

pub mod commands;
pub mod handlers;
pub mod telemetry;
