use bollard_findr::catalog::{self, CatalogSource};
use bollard_findr::config::{self, FindrConfig};
use bollard_findr::facets::parse_selection_arg;
use bollard_findr::view::PageView;
use bollard_findr::{generate, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Facet selections applied, in order, as toggles.
#[derive(clap::Args, Clone)]
struct SelectArgs {
    /// Toggle a facet value, as DIMENSION=VALUE (repeatable)
    #[arg(long = "select", short = 's', value_name = "DIMENSION=VALUE", value_parser = parse_selection_arg)]
    selections: Vec<(String, String)>,
}

#[derive(Parser)]
#[command(name = "bollard-findr")]
#[command(about = "Browse bollard reference photos with facet filters")]
#[command(long_about = "\
Browse bollard reference photos with facet filters

The catalog is a YAML, JSON or TOML document listing every image and its tags:

  images:
    - src: bollard_314.jpg
      alt: Bollard in Italy
      name: italy
      colors: [red, white]     # all selected colors must be present
      continent: Europe        # any selected continent matches
      side: right

Selections are toggles: passing the same DIMENSION=VALUE twice clears it.

Run 'bollard-findr gen-config' to generate a documented findr.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults are used when it does not exist)
    #[arg(long, default_value = "findr.toml", global = true)]
    config: PathBuf,

    /// Catalog location (path or http(s) URL), overriding the config
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available values of every facet
    Facets,
    /// Print the images matching the selected facet values
    Filter {
        #[command(flatten)]
        select: SelectArgs,
        /// Print the page state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the gallery page for the selected facet values
    Render {
        #[command(flatten)]
        select: SelectArgs,
        /// Output HTML file
        #[arg(long, short = 'o', default_value = "dist/index.html")]
        output: PathBuf,
    },
    /// Validate the catalog document without filtering
    Check,
    /// Print a stock findr.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Facets => {
            let (config, source) = load_settings(&cli.config, cli.catalog)?;
            let view = open_view(&config, &source, &[]).await;
            output::print_facets_output(&view);
        }
        Command::Filter { select, json } => {
            let (config, source) = load_settings(&cli.config, cli.catalog)?;
            let view = open_view(&config, &source, &select.selections).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.snapshot())?);
            } else {
                output::print_filter_output(&view, &config);
            }
        }
        Command::Render { select, output: html_path } => {
            let (config, source) = load_settings(&cli.config, cli.catalog)?;
            let view = open_view(&config, &source, &select.selections).await;
            generate::generate(&view, &config, &html_path)?;
            println!(
                "Rendered {} of {} images → {}",
                view.visible().len(),
                view.catalog().len(),
                html_path.display()
            );
        }
        Command::Check => {
            let (config, source) = load_settings(&cli.config, cli.catalog)?;
            // Strict: a broken catalog is an error here, not an empty page.
            let catalog = catalog::fetch_catalog(&source).await?;
            output::print_check_output(&catalog, &source, &config.facets);
            println!("==> Catalog is valid");
        }
    }

    Ok(())
}

/// Load the config and resolve the catalog location against `base_path`.
fn load_settings(
    config_path: &Path,
    catalog_override: Option<String>,
) -> Result<(FindrConfig, CatalogSource), config::ConfigError> {
    let mut config = config::load_config(config_path)?;
    if let Some(location) = catalog_override {
        config.catalog = location;
    }
    let source = CatalogSource::resolve(&config.catalog, &config.base_path);
    Ok((config, source))
}

/// Load one page view and apply the selections as toggles, in order.
async fn open_view(
    config: &FindrConfig,
    source: &CatalogSource,
    selections: &[(String, String)],
) -> PageView {
    let mut view = PageView::new(config.facets.clone());
    view.load(source).await;
    for (dimension, value) in selections {
        view.toggle(dimension, value);
    }
    view
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
