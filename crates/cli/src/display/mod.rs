pub mod formatter;

pub use formatter::{OutputFormat, format_locations};
