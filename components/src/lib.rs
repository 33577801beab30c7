// Shared TUI primitives library
// Stateful, reusable UI primitives for terminal applications

// Core infrastructure (state ownership, contexts, host resources)
pub mod core;
// Visual elements (dialog, tabs)
pub mod elements;
// Utilities and helpers
pub mod utilities;

// Re-export commonly used items
pub use crate::core::*;
pub use crate::elements::*;
pub use crate::utilities::*;
