//! Word-typing trainer: pick a dictionary and chapter, type each word, and
//! keep a ranked book of the words you get wrong.
//!
//! The binary in `main.rs` is a terminal front end over [`session::trainer::Trainer`].

pub mod config;
pub mod dict;
pub mod error;
pub mod session;
pub mod store;
pub mod ui;

pub use error::{Result, TrainerError};
