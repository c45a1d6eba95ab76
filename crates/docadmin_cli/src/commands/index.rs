//! Index command implementation.

use super::{demo, Format};
use serde::Serialize;

/// A registered collection.
#[derive(Debug, Serialize)]
pub struct CollectionInfo {
    /// Full identifier.
    pub collection: String,
    /// Rust type administered.
    pub shape: &'static str,
    /// Field names and kinds in declaration order.
    pub fields: Vec<(String, &'static str)>,
}

/// Runs the index command.
pub fn run(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let format = Format::parse(format)?;
    let registry = demo::registry()?;

    let mut collections: Vec<CollectionInfo> = registry
        .descriptors()
        .iter()
        .map(|d| CollectionInfo {
            collection: d.collection().to_string(),
            shape: d.type_name(),
            fields: d
                .fields()
                .iter()
                .map(|f| (f.name.clone(), f.kind.name()))
                .collect(),
        })
        .collect();
    collections.sort_by(|a, b| a.collection.cmp(&b.collection));

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&collections)?),
        Format::Text => {
            for info in &collections {
                println!("{} ({})", info.collection, info.shape);
                for (name, kind) in &info.fields {
                    println!("  {name:<12} {kind}");
                }
            }
        }
    }
    Ok(())
}
