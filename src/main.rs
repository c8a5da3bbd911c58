use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = relais::cli::Cli::parse();
    if let Err(e) = relais::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
