mod backend;
mod config;
mod desk;
mod display;
mod error;
mod form;
mod panels;
mod parser;
mod preview;
mod suggest;
mod web;

use config::{Config, DEFAULT_PORT};
use display::{print_saved_appointments, print_suggestions};
use form::AppointmentStore;
use suggest::Gazetteer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("web") => {
            let port = args.get(2)
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT);
            let config = Config::from_env(port);

            println!("Starting web server on port {}...", config.port);
            println!("OCR backend: {}", config.backend_url);
            println!("Access the site at http://localhost:{}", config.port);

            web::start_server(config).await?;
        }
        Some("suggest") => {
            let raw_name = args[2..].join(" ");
            if raw_name.trim().is_empty() {
                return Err("usage: mobility-desk suggest <location name>".into());
            }
            let config = Config::from_env(DEFAULT_PORT);
            let gazetteer = Gazetteer::from_csv(&config.gazetteer_path)?;
            println!("Loaded {} locations from {}", gazetteer.len(), config.gazetteer_path.display());
            print_suggestions(&raw_name, &gazetteer.suggest(&raw_name));
        }
        Some("saved") => {
            let config = Config::from_env(DEFAULT_PORT);
            let store = AppointmentStore::new(&config.store_path);
            print_saved_appointments(&store.load()?);
        }
        _ => {
            println!("usage:");
            println!("  mobility-desk web [port]            serve the review page (default port {})", DEFAULT_PORT);
            println!("  mobility-desk suggest <location>    rank gazetteer names for a raw location");
            println!("  mobility-desk saved                 list stored appointments");
        }
    }

    Ok(())
}
