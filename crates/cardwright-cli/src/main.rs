use std::io::Read;
use std::path::{Path, PathBuf};

use cardwright_common::telemetry::{self, TelemetryConfig};
use cardwright_common::{
    CatalogClient, Config, FileStore, TemplateCard, TemplateCategory, TemplateGroup,
};
use cardwright_editor_core::{TemplatesState, derive_fields, templates::build_group_views};
use miette::{IntoDiagnostic, Result};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Cardwright - browse card templates and render card text", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config file (defaults to <config dir>/cardwright/config.json)
    #[arg(long, global = true, env = "CARDWRIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render card markdown to HTML
    Render {
        /// Markdown file, or `-` for stdin
        input: PathBuf,

        /// Render a single inline fragment without block wrappers
        #[arg(long)]
        inline: bool,
    },
    /// List catalog templates
    Catalog {
        /// Only show templates whose name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Only fetch one category (ancestry, community, subclass, domain-card)
        #[arg(long)]
        category: Option<TemplateCategory>,

        /// Print the groups as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the editable fields derived from a catalog card
    Derive {
        /// Card slug
        slug: String,

        /// Category to search (all categories by default)
        #[arg(long)]
        category: Option<TemplateCategory>,

        /// Also print the description rendered as HTML
        #[arg(long)]
        html: bool,
    },
    /// Show or initialize the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config (file merged with environment)
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    init_telemetry(cli.verbose);

    let store = FileStore::new(cli.config.unwrap_or_else(default_config_path));

    match cli.command {
        Commands::Render { input, inline } => render(&input, inline)?,
        Commands::Catalog {
            search,
            category,
            json,
        } => {
            let config = load_config(&store)?;
            list_catalog(&config, category, search.unwrap_or_default(), json).await?;
        }
        Commands::Derive {
            slug,
            category,
            html,
        } => {
            let config = load_config(&store)?;
            derive_card(&config, &slug, category, html).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = load_config(&store)?;
                println!("{}", serde_json::to_string_pretty(&config).into_diagnostic()?);
            }
            ConfigAction::Path => println!("{}", store.path().display()),
            ConfigAction::Init { force } => {
                if store.path().exists() && !force {
                    return Err(miette::miette!(
                        help = "pass --force to overwrite it",
                        "config file already exists: {}",
                        store.path().display()
                    ));
                }
                store.save(&Config::default())?;
                println!("✓ Wrote {}", store.path().display());
            }
        },
    }

    Ok(())
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardwright")
        .join("config.json")
}

fn load_config(store: &FileStore) -> Result<Config> {
    let config = store
        .load_or_default()?
        .merge_env(|var| std::env::var(var).ok())?;
    tracing::debug!(api_base = %config.api_base, lang = %config.lang, "loaded config");
    Ok(config)
}

fn render(input: &Path, inline: bool) -> Result<()> {
    let source = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
        buf
    } else {
        std::fs::read_to_string(input)
            .into_diagnostic()
            .map_err(|e| e.wrap_err(format!("failed to read {}", input.display())))?
    };

    let html = if inline {
        cardwright_renderer::render_inline(source.trim_end())
    } else {
        cardwright_renderer::render_markdown(&source)
    };
    println!("{html}");
    Ok(())
}

async fn fetch_groups(
    client: &CatalogClient,
    category: Option<TemplateCategory>,
) -> Result<Vec<TemplateGroup>> {
    let groups = match category {
        Some(category) => vec![client.fetch_category(category).await?],
        None => client.fetch_collection().await?.template_groups,
    };
    Ok(groups)
}

async fn list_catalog(
    config: &Config,
    category: Option<TemplateCategory>,
    search: String,
    json: bool,
) -> Result<()> {
    let client = CatalogClient::from_config(config);
    let state = TemplatesState {
        template_groups: fetch_groups(&client, category).await?,
        search_term: search,
        ..Default::default()
    };
    let views = build_group_views(&state);

    if json {
        let groups: Vec<TemplateGroup> = views
            .into_iter()
            .map(|view| TemplateGroup {
                id: view.id,
                title: view.title,
                items: view.filtered_items,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&groups).into_diagnostic()?);
        return Ok(());
    }

    for view in views {
        println!("{} ({})", view.title, view.filtered_items.len());
        for card in &view.filtered_items {
            println!("  {:<32} {}", card.slug, card.name);
        }
    }
    Ok(())
}

/// First card with `slug` across `groups`.
fn find_card(groups: Vec<TemplateGroup>, slug: &str) -> Option<TemplateCard> {
    groups
        .into_iter()
        .flat_map(|group| group.items)
        .find(|card| card.slug == slug)
}

async fn derive_card(
    config: &Config,
    slug: &str,
    category: Option<TemplateCategory>,
    html: bool,
) -> Result<()> {
    let client = CatalogClient::from_config(config);
    let card = find_card(fetch_groups(&client, category).await?, slug)
        .ok_or_else(|| miette::miette!("no template with slug {slug}"))?;

    let derived = derive_fields(&card);
    let mut output = serde_json::json!({
        "typeId": derived.type_id,
        "selectedFeatureIndex": derived.selected_feature_index,
        "cardFields": derived.card_fields,
    });
    if html {
        output["descriptionHtml"] =
            cardwright_renderer::render_markdown(&derived.card_fields.description).into();
    }
    println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
    Ok(())
}

fn init_telemetry(verbose: u8) {
    let config = TelemetryConfig::from_env("cardwright-cli");
    let config = match verbose {
        0 => config,
        1 => config.with_level(tracing::Level::DEBUG),
        _ => config.with_level(tracing::Level::TRACE),
    };
    telemetry::init(config);
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
