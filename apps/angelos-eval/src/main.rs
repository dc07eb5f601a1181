use clap::Parser;

use angelos_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	angelos_eval::run(args).await
}
