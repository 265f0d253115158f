//! CLI command implementations.

pub mod chunk;
pub mod cleanup;
pub mod pull;
pub mod push;
pub mod status;
pub mod verify;
