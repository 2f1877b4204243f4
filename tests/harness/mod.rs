//! Integration Test Harness
//!
//! - `NatslyTest` - Spawns a real server on a random port over a temp static tree
//! - `MockServices` - Local stand-in for the DeepAI and Pi Network APIs

mod mock;
mod server;

pub use mock::{MockServices, DEEPAI_KEY, PI_KEY};
pub use server::NatslyTest;
