use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use dhlparcel::config::{CliArgs, Command, Config, LogFormat};
use dhlparcel::endpoints::{ParcelShopQuery, ProductQuery};
use dhlparcel::DhlParcelClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = Config::from_args(&args)?;
    config.validate()?;

    init_logging(&config);

    tracing::debug!("Token cache: {}", config.token_cache_file.display());
    let client = DhlParcelClient::new(config)?;

    match args.command {
        Command::Authenticate => {
            let bundle = client.authenticate().await?;
            tracing::info!(
                "✅ Authentication successful (token: {}...)",
                token_preview(&bundle.access_token)
            );
            print_json(&serde_json::json!({
                "accessTokenExpiration": bundle.access_token_expiration,
                "refreshTokenExpiration": bundle.refresh_token_expiration,
            }))?;
        }

        Command::Products {
            from_country,
            to_country,
        } => {
            let query = ProductQuery {
                from_country,
                to_country,
                ..Default::default()
            };
            print_json(&client.products().list(&query).await?)?;
        }

        Command::ParcelShops {
            country,
            postal_code,
            city,
            fuzzy,
            limit,
        } => {
            let query = ParcelShopQuery {
                postal_code,
                city,
                fuzzy,
                limit,
                ..Default::default()
            };
            print_json(&client.parcel_shops().list(&country, &query).await?)?;
        }

        Command::PickupAvailability {
            country,
            postal_code,
        } => {
            print_json(&client.pickup_availability().list(&country, &postal_code).await?)?;
        }

        Command::Label { id, output } => match output {
            Some(path) => {
                let pdf = client.labels().get_pdf(&id).await?;
                std::fs::write(&path, &pdf)
                    .with_context(|| format!("Failed to write label to {}", path.display()))?;
                tracing::info!("Saved label {} ({} bytes) to {}", id, pdf.len(), path.display());
            }
            None => print_json(&client.labels().get(&id).await?)?,
        },
    }

    Ok(())
}

/// Initialize logging with the configured level and format
fn init_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().with_ansi(false).init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to render response")?;
    println!("{}", text);
    Ok(())
}

/// First characters of a token, safe for logs
fn token_preview(token: &str) -> String {
    token.chars().take(12).collect()
}
