use cabinetry_backend::app::app::App;
use cabinetry_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_result = dotenv();
    // Keeps the file writers alive for the lifetime of the process.
    let _logger = Logger::new()?;

    info!("Starting cabinetry workshop backend");
    match dotenv_result {
        Ok(_) => info!("Loaded .env file"),
        Err(e) => warn!("Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await.inspect_err(|e| error!("Startup failed: {}", e))?;
    app.start().await?;
    Ok(())
}
