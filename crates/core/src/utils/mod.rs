pub mod path;

pub use path::{normalize, normalize_relative, relative_to};
