use std::error::Error;
use std::path::Path;
use std::time::Duration;

use asmdex_lib::cli::{Cli, Command};
use asmdex_lib::config::{get_settings_path, save_config};
use asmdex_lib::indexer::{FsWorkspace, IndexWatcher, IndexerManager, Workspace};
use asmdex_lib::navigation::{identifier_at, line_text};
use asmdex_lib::symbol_index::{DefinitionLocation, Position};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `ASMDEX_LOG` uses `RUST_LOG` syntax and defaults to `info`.
fn init_tracing() {
    let filter = std::env::var("ASMDEX_LOG")
        .map(|val| EnvFilter::builder().parse_lossy(val))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Locations as `path:line:column`, 1-based, relative to the root when possible.
fn print_locations(workspace: &FsWorkspace, locations: &[DefinitionLocation]) {
    if locations.is_empty() {
        println!("no definition");
    }
    for location in locations {
        let start = location.range.start;
        let path = workspace
            .to_relative(Path::new(&location.uri))
            .unwrap_or_else(|| location.uri.clone());
        println!("{}:{}:{}", path, start.line + 1, start.character + 1);
    }
}

async fn run(cli: Cli, manager: &IndexerManager<FsWorkspace>) -> Result<(), Box<dyn Error>> {
    let cancel = CancellationToken::new();

    match cli.command {
        Command::Init { force } => {
            let settings_path = get_settings_path(manager.workspace().root());
            if settings_path.exists() && !force {
                return Err(format!("{} already exists", settings_path.display()).into());
            }
            save_config(manager.workspace().root(), manager.config())?;
            println!("wrote {}", settings_path.display());
        }
        Command::Scan => {
            let stats = manager.ensure_initialized().await;
            manager.save_now().await?;
            println!(
                "{} files, {} definitions, {} documents in index",
                stats.files_indexed,
                stats.definitions_total,
                manager.document_count().await
            );
        }
        Command::Kind { name } => match manager.lookup_symbol_kind(&name, &cancel).await {
            Some(kind) => println!("{}", kind),
            None => println!("undefined"),
        },
        Command::Goto { name } => {
            print_locations(manager.workspace(), &manager.find_definitions(&name, &cancel).await);
        }
        Command::At { file, line, column } => {
            if line == 0 || column == 0 {
                return Err("line and column are 1-based".into());
            }
            let path = manager.workspace().root().join(file);
            let document = manager.workspace().open_document(&path).await?;
            let position = Position::new(line - 1, column - 1);
            let Some(identifier) = line_text(&document.text, position.line)
                .and_then(|text| identifier_at(text, position.character))
            else {
                println!("no identifier");
                return Ok(());
            };
            let range = identifier.range(position.line);
            println!(
                "{} ({}:{}-{})",
                identifier.name,
                range.start.line + 1,
                range.start.character + 1,
                range.end.character + 1
            );
            print_locations(
                manager.workspace(),
                &manager.definition_at(&document, position, &cancel).await,
            );
        }
        Command::Watch { debounce_ms } => {
            manager.ensure_initialized().await;
            let _watcher = IndexWatcher::new(manager.clone(), Duration::from_millis(debounce_ms))?;
            tokio::signal::ctrl_c().await?;
            tracing::info!("Interrupted, stopping");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let root = std::fs::canonicalize(Path::new(&cli.root))?;
    let manager = IndexerManager::for_root(&root);

    let result = run(cli, &manager).await;
    manager.shutdown().await;
    result
}
