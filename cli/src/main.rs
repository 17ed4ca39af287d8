pub mod commands;

use crate::commands::handler;
use crate::commands::types::Opts;
use anyhow::Result;
use clap::Parser;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();
    log::debug!("{:?}", &opts);
    let runtime = Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async { handler(opts).await })
}
