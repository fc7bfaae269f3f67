// lodestar_core/src/lib.rs

// This file defines the public modules of the library.
pub mod accumulator;
pub mod config;
pub mod controller;
pub mod correction;
pub mod error;
pub mod map;
pub mod messages;
pub mod prelude;
pub mod queue;
pub mod registration;
pub mod state_machine;
pub mod types;
