use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cli::{hit_line, names_line, nearest_line};
use console::style;
use core_types::LayerKind;
use core_types::config::{AppConfig, load_or_create_config};
use semantic_index::{Metadata, VectorStore};
use service::{RetrievalOrchestrator, init_tracing_with_config};
use std::path::PathBuf;

/// Debug / scripting CLI for the GeoRAG retrieval core.
#[derive(Parser, Debug)]
#[command(name = "georag", version = cli::VERSION, about = "GeoRAG retrieval debug client")]
struct Cli {
    /// Config file (falls back to $GEORAG_CONFIG, then ./georag.toml).
    #[arg(long, global = true, env = "GEORAG_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Embed a text under an id and persist it.
    Add {
        id: String,
        text: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Bulk-add a JSON array of records (defaults to the configured path).
    Ingest { records: Option<PathBuf> },
    /// Raw similarity search over the store.
    Search {
        query: String,
        #[arg(short, default_value_t = 5)]
        k: usize,
    },
    /// Ranked, spatially annotated retrieval.
    Query { text: String },
    /// Features containing (or within the buffer of) a point.
    Within {
        lat: f64,
        lon: f64,
        #[arg(long, value_enum, default_value_t = LayerArg::Cities)]
        layer: LayerArg,
        #[arg(long)]
        buffer: Option<f64>,
    },
    /// Nearest feature to a point.
    Nearest {
        lat: f64,
        lon: f64,
        #[arg(long, value_enum, default_value_t = LayerArg::Rivers)]
        layer: LayerArg,
        #[arg(short)]
        k: Option<usize>,
    },
    /// Features intersecting a lat/lon box.
    Bbox {
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
        #[arg(long, value_enum, default_value_t = LayerArg::Cities)]
        layer: LayerArg,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LayerArg {
    Cities,
    Rivers,
}

impl From<LayerArg> for LayerKind {
    fn from(arg: LayerArg) -> Self {
        match arg {
            LayerArg::Cities => Self::City,
            LayerArg::Rivers => Self::River,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let cfg = load_or_create_config(cli.config.as_deref())?;
    let _guard = init_tracing_with_config(&cfg.logging)?;
    tracing::debug!(command = ?cli.command, "dispatching");

    match cli.command {
        Commands::Add {
            id,
            text,
            title,
            description,
        } => {
            let mut store = open_store(&cfg)?;
            let meta = (title.is_some() || description.is_some()).then(|| {
                let mut meta = Metadata::new();
                if let Some(title) = title {
                    meta.insert("title".into(), title.into());
                }
                if let Some(description) = description {
                    meta.insert("description".into(), description.into());
                }
                meta
            });
            store.add(id.as_str(), &text, meta)?;
            println!("{} {id} ({} items)", style("stored").green(), store.len());
        }
        Commands::Ingest { records } => {
            let path = records.unwrap_or_else(|| PathBuf::from(&cfg.paths.records));
            let mut store = open_store(&cfg)?;
            let added = store
                .ingest_records(&path)
                .with_context(|| format!("ingesting {}", path.display()))?;
            println!(
                "{} {added} records from {}",
                style("ingested").green(),
                path.display()
            );
        }
        Commands::Search { query, k } => {
            let store = open_store(&cfg)?;
            let hits = store.search(&query, k)?;
            if hits.is_empty() {
                println!("{}", style("no results").yellow());
            }
            for hit in &hits {
                println!("{}", hit_line(hit, store.metadata(&hit.id)));
            }
        }
        Commands::Query { text } => {
            let orch = RetrievalOrchestrator::from_config(&cfg)?;
            let items = orch.query(&text)?;
            println!("{}", style(format!("Query: {text}")).cyan());
            for (n, item) in items.iter().enumerate() {
                println!("{}. {item}", n + 1);
            }
        }
        Commands::Within {
            lat,
            lon,
            layer,
            buffer,
        } => {
            let orch = RetrievalOrchestrator::from_config(&cfg)?;
            let names = orch.within(layer.into(), lat, lon, buffer)?;
            println!("{}", names_line(&names));
        }
        Commands::Nearest { lat, lon, layer, k } => {
            let orch = RetrievalOrchestrator::from_config(&cfg)?;
            match orch.nearest(layer.into(), lat, lon, k)? {
                Some(hit) => println!("{}", nearest_line(&hit)),
                None => println!("{}", style("layer is empty").yellow()),
            }
        }
        Commands::Bbox {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
            layer,
        } => {
            let orch = RetrievalOrchestrator::from_config(&cfg)?;
            let names = orch.in_bbox(layer.into(), min_lat, min_lon, max_lat, max_lon)?;
            println!("{}", names_line(&names));
        }
    }
    Ok(())
}

fn open_store(cfg: &AppConfig) -> Result<VectorStore> {
    VectorStore::open(&cfg.paths.store)
        .with_context(|| format!("opening vector store {}", cfg.paths.store))
}
