// Utility functions and helpers

pub mod helpers;

pub use helpers::*;
