//! Copysmith CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use copysmith::config::{Config, LlmBackend};
use copysmith::data::{self, BrandBook, Catalog};
use copysmith::pipeline::Pipeline;
use copysmith::{Error, llm};

#[derive(Parser)]
#[command(name = "copysmith", version, about = "Persona-driven marketing copy pipeline")]
struct Cli {
    /// Directory holding products.json, brand_rules.json, customers.json.
    /// Overrides DATA_DIR.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline for one customer and print the result bundle as JSON.
    Run {
        /// Customer id from customers.json.
        #[arg(long)]
        customer: String,

        /// Retry budget for the compliance loop. Overrides MAX_RETRIES.
        #[arg(long)]
        max_retries: Option<u32>,

        /// Skip the network and use the deterministic fallback templates.
        #[arg(long)]
        offline: bool,
    },
    /// List the loaded product catalog.
    Catalog,
    /// List the loaded customer roster.
    Customers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("copysmith=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().map_err(Error::Config)?;
    if let Some(data_dir) = cli.data_dir {
        config.engine.data_dir = data_dir;
    }

    let data_dir = config.engine.data_dir.clone();
    let catalog = Catalog::load(&data_dir.join("products.json"))
        .map_err(Error::Data)
        .context("loading product catalog")?;
    let brands = BrandBook::load(&data_dir.join("brand_rules.json"))
        .map_err(Error::Data)
        .context("loading brand rules")?;

    match cli.command {
        Command::Run {
            customer,
            max_retries,
            offline,
        } => {
            let customers = data::load_customers(&data_dir.join("customers.json"))
                .map_err(Error::Data)
                .context("loading customer roster")?;
            let record = data::find_customer(&customers, &customer).map_err(Error::Data)?;

            if offline {
                config.llm.backend = LlmBackend::Offline;
            }
            let generator = llm::create_generator(&config.llm).map_err(Error::Generation)?;

            let pipeline = Pipeline::new(
                Arc::new(catalog),
                Arc::new(brands),
                generator,
                max_retries.unwrap_or(config.engine.max_retries),
            );
            let report = pipeline.run(&record.signal).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Catalog => {
            for product in catalog.products() {
                let personas = product
                    .target_personas
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "{} | {} | {} | [{}]",
                    product.product_id, product.brand_id, product.name, personas
                );
            }
        }
        Command::Customers => {
            let customers = data::load_customers(&data_dir.join("customers.json"))
                .map_err(Error::Data)
                .context("loading customer roster")?;
            for record in &customers {
                println!(
                    "{} | {}세 | {}",
                    record.id, record.signal.profile.age, record.signal.profile.skin_type
                );
            }
        }
    }

    Ok(())
}
