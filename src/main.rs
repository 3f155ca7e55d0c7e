//! Order service entry point.

use order_service::cli::{self, Cli};
use order_service::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli::execute(cli).await
}
