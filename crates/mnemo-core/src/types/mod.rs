//! Core types for mnemo.

mod card;
mod message;
mod outcome;

pub use card::*;
pub use message::*;
pub use outcome::*;
