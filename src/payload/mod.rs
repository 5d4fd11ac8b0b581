// src/payload/mod.rs
mod case;
mod state;

pub use case::to_snake_case;
pub use state::{Payload, State};
