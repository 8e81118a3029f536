use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = oppfinder_api::Args::parse();

	oppfinder_api::run(args).await
}
