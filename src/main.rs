use anyhow::{Context, Result};
use tracing::info;

use miluva_uci::UciEngine;

fn main() -> Result<()> {
    // stdout belongs to the UCI protocol
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!("miluva starting");
    UciEngine::new().run().context("UCI engine failed")
}
