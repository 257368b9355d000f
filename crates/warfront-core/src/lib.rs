//! Core types and definitions for the WARFRONT combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, network commands, events, the entity pool, the kill
//! queue, and constants. It has no dependency on any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod kill_queue;
pub mod pool;
pub mod state;
pub mod target_handle;
pub mod types;

#[cfg(test)]
mod tests;
