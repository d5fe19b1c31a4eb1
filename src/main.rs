use anyhow::Result;

use crate::config::SETTINGS;

pub mod calculation;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod event;
pub mod logging;
pub mod result_file;
pub mod ticker;
pub mod util;

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if let Err(why) = event::average_price::execute(&SETTINGS).await {
        logging::error_console(format!("{:#}", why));
        logging::error_file_async(format!("{:?}", why));
        return Err(why);
    }

    Ok(())
}
