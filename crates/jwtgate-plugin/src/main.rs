//! jwtgate-plugin entry point

use clap::Parser;
use jwtgate_plugin::PluginConfig;

#[tokio::main]
async fn main() {
    let config = PluginConfig::parse();

    if let Err(e) = jwtgate_plugin::run(config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
