//! Score codec and ranking engine for functional fitness competitions.
//!
//! Everything here is a pure, synchronous function over in-memory data:
//! callers fetch scores, call in, and persist what comes out.

pub mod codec;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;

pub use error::{Result, ScoringError};
