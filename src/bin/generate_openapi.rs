//! Exports the Plant Monitor OpenAPI document: sensor ingestion and zone
//! queries under `/api/v1/sensor-data`, the growth-rate, optimal-conditions
//! and yield-prediction analytics under `/api/v1/analytics`, and the
//! `/register`, `/login` and `/me` user endpoints with their `bearer` scheme.
//!
//! Usage:
//!   cargo run --bin generate_openapi > openapi.json
//!   cargo run --bin generate_openapi -- --output openapi.json
//!   cargo run --bin generate_openapi -- --compact

use std::{fs, io::Write, path::PathBuf, process};

use plant_monitor_service::api::handlers::ApiDoc;
use utoipa::OpenApi;

struct Args {
    output: Option<PathBuf>,
    compact: bool,
}

impl Args {
    fn parse(args: &[String]) -> Self {
        Self {
            output: args
                .windows(2)
                .find(|w| w[0] == "--output")
                .map(|w| PathBuf::from(&w[1])),
            compact: args.iter().any(|a| a == "--compact"),
        }
    }
}

fn render(compact: bool) -> serde_json::Result<String> {
    let doc = ApiDoc::openapi();
    if compact {
        doc.to_json()
    } else {
        doc.to_pretty_json()
    }
}

fn main() {
    let args = Args::parse(&std::env::args().collect::<Vec<_>>());

    let document = render(args.compact).unwrap_or_else(|e| {
        eprintln!("Failed to serialise the Plant Monitor API document: {e}");
        process::exit(1);
    });

    let written = match &args.output {
        Some(path) => fs::write(path, &document).map(|()| {
            eprintln!(
                "Plant Monitor API document ({} paths) written to {}",
                ApiDoc::openapi().paths.paths.len(),
                path.display()
            );
        }),
        None => std::io::stdout().write_all(document.as_bytes()),
    };

    if let Err(e) = written {
        eprintln!("Failed to write the API document: {e}");
        process::exit(1);
    }
}
