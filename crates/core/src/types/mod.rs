pub mod location;

// Re-export commonly used types
pub use location::{BuildLocation, NotFoundReason, Resolution};
