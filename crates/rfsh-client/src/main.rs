//! rfsh binary entry point.

use clap::Parser;
use tracing::{error, info};

use rfsh_client::render::color;
use rfsh_client::{Cli, SessionController, TcpFileClient};
use rfsh_core::keepalive::KeepaliveConfig;
use rfsh_core::{Result, Settings};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = rfsh_core::init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "rfsh starting");

    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "cannot load settings");
            eprintln!("rfsh: {e}");
            std::process::exit(1);
        }
    };
    cli.apply_to(&mut settings);

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let code = match rt.block_on(run(settings)) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "session failed");
            eprintln!("rfsh: {e}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(settings: Settings) -> Result<i32> {
    println!("Welcome to rfsh!");
    println!(
        "{}Connecting to {}:{}...{}",
        color::YELLOW,
        settings.server,
        settings.port,
        color::RESET
    );

    let client = TcpFileClient::connect(&settings.server, settings.port).await?;
    let endpoint = format!("{}:{}", settings.server, settings.port);

    let mut controller =
        SessionController::new(client, settings, KeepaliveConfig::default());
    controller.start().await?;
    println!(
        "{}Connected to {endpoint}{}",
        color::GREEN,
        color::RESET
    );

    controller.run().await
}
