pub mod code;
pub mod scoring;

// Re-export main components
pub use code::*;
pub use scoring::*;
