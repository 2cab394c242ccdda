use clap::Parser;
use imagesearch::bootstrap::init_tracing_subscriber;
use imagesearch::cli::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the config file and real env still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing_subscriber(cli.log_dir.as_deref())?;

    run(cli).await
}
