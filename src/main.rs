use clap::Parser;
use searchrag::cli::Cli;
use searchrag::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    searchrag::cli::run(cli, &mut stdout).await
}
