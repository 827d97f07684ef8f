use chrono::Local;
use denue::{
    info_time, logger, process::process_registry, request::HttpSource, Config, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();
    let start_time = Local::now();

    let config = Config::load()?;
    let source = HttpSource::new(&config)?;
    process_registry(&config, &source).await?;
    info_time!(start_time, "Full program time:");

    Ok(())
}
