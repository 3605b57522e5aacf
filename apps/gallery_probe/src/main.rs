use std::time::Duration;

use anyhow::Result;
use catalog_core::{
    CatalogCache, HostAllowlist, HttpCatalogClient, DEFAULT_API_BASE_URL, DEFAULT_IMAGE_HOSTS,
};
use clap::{Parser, Subcommand};
use shared::domain::{ColorKey, VehicleKey};
use tracing_subscriber::EnvFilter;

/// Queries the rendering catalog from the command line and prints JSON.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, env = "GALLERY_API_URL", default_value = DEFAULT_API_BASE_URL)]
    api_url: String,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every car.
    Cars,
    /// List the colors of one car, in display order.
    Colors {
        model_range: String,
        type_code: String,
    },
    /// List the renderings of one car in one color.
    Media {
        model_range: String,
        type_code: String,
        color: String,
        /// Report renderings whose URL the gallery would refuse to load.
        #[arg(long)]
        check_hosts: bool,
        /// Host to accept when checking; repeat for several.
        #[arg(long = "allowed-host")]
        allowed_hosts: Vec<String>,
    },
}

fn vehicle_key(model_range: &str, type_code: &str) -> VehicleKey {
    VehicleKey {
        model_range: model_range.into(),
        type_code: type_code.into(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let client = HttpCatalogClient::new(&cli.api_url, Duration::from_secs(cli.timeout_secs))?;
    let catalog = CatalogCache::new(client);

    match cli.command {
        Command::Cars => {
            let vehicles = catalog.vehicles().await?;
            println!("{}", serde_json::to_string_pretty(vehicles.as_ref())?);
        }
        Command::Colors {
            model_range,
            type_code,
        } => {
            let colors = catalog
                .colors(&vehicle_key(&model_range, &type_code))
                .await?;
            println!("{}", serde_json::to_string_pretty(colors.as_ref())?);
        }
        Command::Media {
            model_range,
            type_code,
            color,
            check_hosts,
            allowed_hosts,
        } => {
            let key = ColorKey {
                vehicle: vehicle_key(&model_range, &type_code),
                color: color.as_str().into(),
            };
            let images = catalog.images(&key).await?;
            println!("{}", serde_json::to_string_pretty(images.as_ref())?);

            if check_hosts {
                let allowlist = if allowed_hosts.is_empty() {
                    HostAllowlist::new(DEFAULT_IMAGE_HOSTS.iter().copied())
                } else {
                    HostAllowlist::new(&allowed_hosts)
                };
                let mut refused = 0usize;
                for image in images.iter() {
                    if let Err(err) = allowlist.check(&image.url) {
                        refused += 1;
                        eprintln!("refused {}: {err}", image.url);
                    }
                }
                eprintln!("{refused} of {} renderings refused", images.len());
            }
        }
    }

    Ok(())
}
