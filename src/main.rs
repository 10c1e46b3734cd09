mod api;
mod command;
mod config;
mod error;
mod post;
mod render;
mod services;
mod session;
mod time;
mod view;

#[cfg(test)]
mod testing;

use std::{error::Error, io::stdout, sync::Arc};

use api::strapi::StrapiClient;
use config::Config;
use log::info;
use session::{stdin_lines, Session};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    config.init_logger();
    info!("# Strapi Post #");
    info!("{}/api/{} -> {}", config.api_url(), config.collection(), config.slug());

    let client = StrapiClient::new(&config)?;
    let mut session = Session::new(&config, Arc::new(client), stdout());
    session.run(stdin_lines()).await?;

    info!("Bye!");
    Ok(())
}
