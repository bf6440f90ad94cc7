//! Pháp Cú - Quote Rotation and Search Engine
//!
//! The shared core behind the Buddhist quote-of-the-moment apps: timed,
//! non-repeating random rotation plus diacritic-insensitive search over
//! Vietnamese and English quote text. Platform shells own windows, storage
//! and presentation; this crate owns selection policy and text matching.

pub mod quote;
pub mod rotation;
pub mod search;
pub mod text;
