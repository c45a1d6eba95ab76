//! DocAdmin CLI
//!
//! Command-line tools for exercising a DocAdmin engine against a demo
//! registry and an in-memory store.
//!
//! # Commands
//!
//! - `routes` - Show the route table
//! - `index` - Show registered collections and their fields
//! - `request` - Run one request through the admin and print the response

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// DocAdmin command-line tools.
#[derive(Parser)]
#[command(name = "docadmin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Mount every admin route under this path prefix
    #[arg(global = true, long)]
    prefix: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the route table
    Routes {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show registered collections and their fields
    Index {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run one request through the admin
    Request {
        /// Request method
        method: String,

        /// Request path, optionally with a query string
        path: String,

        /// Form field as name=value (repeatable)
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,

        /// Require HMAC tokens signed with this secret
        #[arg(long)]
        secret: Option<String>,

        /// Issue a token for this user and send it with the request
        #[arg(long, requires = "secret")]
        user: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let routes = commands::routes::route_config(cli.prefix.as_deref())?;

    match cli.command {
        Commands::Routes { format } => {
            commands::routes::run(&routes, &format)?;
        }
        Commands::Index { format } => {
            commands::index::run(&format)?;
        }
        Commands::Request {
            method,
            path,
            fields,
            secret,
            user,
            format,
        } => {
            let options = commands::request::RequestOptions {
                method,
                path,
                fields,
                secret,
                user,
            };
            commands::request::run(routes, options, &format)?;
        }
        Commands::Version => {
            println!("DocAdmin CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
