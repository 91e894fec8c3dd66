use anyhow::{Context, Result};
use goto_build_core::{BuildResolver, Resolution};
use std::io::Write;
use tracing::{debug, info};

use crate::cli::GotoBuild;
use crate::display::format_locations;

/// Resolve `args.input` and write `path:line` (or nothing) to `out`
pub fn resolve_command(args: &GotoBuild, out: &mut impl Write) -> Result<()> {
    debug!("Resolving source file: {:?}", args.input);

    let mut resolver =
        BuildResolver::with_config(args.config()).context("Invalid resolver configuration")?;

    let locations = if args.all {
        resolver.resolve_all(&args.input)
    } else {
        resolver.resolve(&args.input).map(|resolution| match resolution {
            Resolution::Found(location) => vec![location],
            Resolution::NotFound(reason) => {
                info!("{}: {}", args.input.display(), reason);
                Vec::new()
            }
        })
    }
    .with_context(|| format!("Failed to resolve {}", args.input.display()))?;

    debug!("Found {} owning targets", locations.len());
    let rendered = format_locations(&locations, args.format(), args.all)?;
    out.write_all(rendered.as_bytes())?;
    Ok(())
}
