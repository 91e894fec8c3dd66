use anyhow::Result;
use goto_build_core::BuildLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `path:line`, one per line, no trailing newline
    Plain,
    Json,
}

/// Render resolver output; no locations always renders as the empty string
pub fn format_locations(
    locations: &[BuildLocation],
    format: OutputFormat,
    all: bool,
) -> Result<String> {
    if locations.is_empty() {
        return Ok(String::new());
    }

    let rendered = match format {
        OutputFormat::Plain => locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json if all => serde_json::to_string(locations)?,
        OutputFormat::Json => serde_json::to_string(&locations[0])?,
    };
    Ok(rendered)
}
