//! CLI command implementations.

pub mod demo;
pub mod index;
pub mod request;
pub mod routes;

/// Output format shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl Format {
    /// Parses `text` or `json`.
    pub fn parse(format: &str) -> Result<Self, Box<dyn std::error::Error>> {
        match format {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(format!("Unknown output format: {other} (expected text or json)").into()),
        }
    }
}
