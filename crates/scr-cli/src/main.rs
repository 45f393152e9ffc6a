use scr_cli::{commands, logging, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse()?;
    logging::init(cli.log_format, cli.verbosity)?;

    let output = commands::run(&cli.action).await?;
    println!("{output}");
    Ok(())
}
