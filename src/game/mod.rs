//! Game engine: roster, roles, word pairs, turn order, eliminations, scoring
//!
//! Everything in here is synchronous and free of any UI concern. The
//! session layer in `app` drives these pieces in phase order.

pub mod assignment;
pub mod player;
pub mod random;
pub mod resolver;
pub mod scoring;
pub mod setup;
pub mod turns;
pub mod words;
