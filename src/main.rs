use anyhow::{Context, Result, anyhow};
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

use flickr_rpc::{Cli, Client, ConfigManager, Output, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigManager::load_config(&cli)
        .await
        .context("Failed to load configuration")?;
    let client = Client::from_config(&config)?;
    let output = Output::new(OutputFormat::from(config.output.format.clone()));

    let args = cli.call_args().map_err(|e| anyhow!(e))?;
    let method = client.method(cli.method_path(&config.endpoints.namespace));

    if cli.paginate {
        let items = method.paginate(args);
        let mut items = match cli.limit {
            Some(limit) => items.take(limit).boxed(),
            None => items,
        };
        while let Some(item) = items.next().await {
            match item {
                Ok(entity) => println!("{}", output.format_entity(&entity)),
                Err(error) => {
                    eprintln!("{}", output.format_error(&error));
                    std::process::exit(1);
                }
            }
        }
    } else {
        match method.call(args).await {
            Ok(entity) => println!("{}", output.format_entity(&entity)),
            Err(error) => {
                eprintln!("{}", output.format_error(&error));
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
