use anyhow::Result;
use log::info;

use crate::{cli::SchemaArgs, io_utils, schema::ParcelSchema};

/// Writes the default schema so it can be edited and passed back via `--schema`.
pub fn execute(args: &SchemaArgs) -> Result<()> {
    let schema = ParcelSchema::default();
    match args.output.as_deref() {
        Some(path) if !io_utils::is_dash(path) => {
            schema.save(path)?;
            info!(
                "Schema with {} attribute(s) written to {:?}",
                schema.attributes.len(),
                path
            );
        }
        _ => print!("{}", schema.to_yaml()?),
    }
    Ok(())
}
