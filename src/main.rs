mod app;
mod cli;
mod logging;
mod store;
mod terminal;

use clap::Parser;

pub use app::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logging::init_logging(cli.log_format, cli.verbose);

    let app = App::new(cli).await?;
    app.run().await?;

    Ok(())
}
