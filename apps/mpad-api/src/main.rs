use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = mpad_api::Args::parse();

	mpad_api::run(args).await
}
