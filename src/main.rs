use std::sync::Arc;

use chrono::Local;
use earth911_scrap::{
    info_time, log::RunLog, process::Pipeline, Result, Settings, LOG_PATH,
};

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Local::now();
    let log = Arc::new(RunLog::open(LOG_PATH)?);

    let pipeline = Pipeline::from_settings(Settings::default(), log.clone())?;
    pipeline.process_site().await;
    info_time!(log, start_time, "Full program time:");

    Ok(())
}
