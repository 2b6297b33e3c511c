//! Dispatch (§6): resolves config + handles once per process invocation,
//! then maps one parsed [`super::cli::Command`] onto the matching
//! [`crate::orchestrator::Context`] call and prints its JSON payload.

use super::cli::{Cli, Command, SearchCommand};
use crate::config::ConfigLoader;
use crate::domain::patch::PatchOp;
use crate::domain::ports::{AnnIndex, PersistentStore};
use crate::orchestrator::{AnalyzeOptions, Context, ErrorPayload, SemanticSearchOptions};
use crate::store::Store;
use crate::vectorindex::FlatIndex;
use crate::worker::{HttpEmbeddingProvider, ResilientEmbeddingProvider};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::error;

/// Parse, build a [`Context`], run one command, print its result as JSON.
///
/// Returns the process exit code per §6: 0 on success, non-zero on any
/// reported error.
pub async fn run(cli: Cli) -> ExitCode {
    let root = cli.root.clone().unwrap_or_else(|| std::env::current_dir().expect("current directory must be readable"));
    let config = match cli.config.as_deref() {
        Some(path) => ConfigLoader::new().load_with_file(path),
        None => ConfigLoader::new().load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load configuration");
            print_error(&ErrorPayload::new(crate::orchestrator::ErrorCode::InvalidConfig, err.to_string()));
            return ExitCode::FAILURE;
        }
    };

    if let Command::Daemon { action } = &cli.command {
        return super::daemon::run(action, &root);
    }
    if let Command::DaemonWorker = &cli.command {
        return run_daemon_worker(&root, &config).await;
    }

    let ctx = match build_context(&root, &config).await {
        Ok(ctx) => ctx,
        Err(err) => {
            error!(%err, "failed to initialize");
            print_error(&ErrorPayload::new(crate::orchestrator::ErrorCode::InvalidConfig, err.to_string()));
            return ExitCode::FAILURE;
        }
    };

    match run_command(&ctx, &root, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn build_context(root: &Path, config: &crate::config::Config) -> crate::domain::error::Result<Context> {
    let analysis = &config.code_analysis;
    let store = Store::open(&root.join(&analysis.store_path)).await?;
    let store: Arc<dyn PersistentStore> = Arc::new(store);

    let project_id = store.get_or_create_project(&root.to_string_lossy(), &default_label(root)).await?;

    let index_path = root.join(&analysis.faiss_index_path).to_string_lossy().to_string();
    let index = if Path::new(&index_path).exists() {
        FlatIndex::load(&index_path)?
    } else {
        FlatIndex::create(analysis.vector_dim as usize, &index_path)?
    };

    let embedding = if analysis.embedding.enabled {
        let Some(endpoint) = analysis.embedding.endpoint.clone() else {
            return Err(crate::domain::error::Error::config("code_analysis.embedding.enabled is true but no endpoint is configured"));
        };
        let http = HttpEmbeddingProvider::new(endpoint, Duration::from_secs(analysis.embedding.timeout_seconds), analysis.vector_dim as usize)?;
        Some(Arc::new(ResilientEmbeddingProvider::new(Arc::new(http), analysis.worker.circuit_breaker.clone())) as Arc<dyn crate::domain::ports::EmbeddingProvider>)
    } else {
        None
    };

    Ok(Context {
        store,
        index: Arc::new(Mutex::new(index)),
        embedding,
        project_id,
        vector_dim: analysis.vector_dim as usize,
        index_path,
        min_chunk_length: analysis.min_chunk_length,
    })
}

fn default_label(root: &Path) -> String {
    root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| root.to_string_lossy().to_string())
}

async fn run_command(ctx: &Context, root: &Path, command: Command) -> Result<(), ErrorPayload> {
    match command {
        Command::Analyze { dataset, project_label } => {
            let options = AnalyzeOptions {
                dataset,
                project_label,
                max_file_lines: None,
            };
            let stats = ctx
                .analyze(root, &options)
                .await
                .map_err(|err| ErrorPayload::from_domain(err, crate::orchestrator::ErrorCode::InvalidFile))?;
            print_ok(&stats)
        }
        Command::Search { kind } => run_search(ctx, kind).await,
        Command::ListCstBlocks { file, include_code } => print_ok(&ctx.list_cst_blocks(&file, include_code)?),
        Command::QueryCst {
            file,
            selector,
            include_code,
            max_results,
        } => print_ok(&ctx.query_cst(&file, &selector, include_code, max_results)?),
        Command::ComposeCstModule {
            file,
            ops_file,
            apply,
            create_backup,
            return_source,
            return_diff,
        } => {
            let raw = std::fs::read_to_string(&ops_file)
                .map_err(|err| ErrorPayload::new(crate::orchestrator::ErrorCode::FileNotFound, format!("failed to read {}: {err}", ops_file.display())))?;
            let ops: Vec<PatchOp> = serde_json::from_str(&raw)
                .map_err(|err| ErrorPayload::new(crate::orchestrator::ErrorCode::CstModulePatchError, format!("malformed ops file: {err}")))?;
            let result = ctx.compose_cst_module(&file, &ops, apply, create_backup, return_source, return_diff)?;
            print_ok(&result)
        }
        Command::RebuildFaiss { dataset } => {
            let report = ctx.rebuild_faiss(dataset.as_deref()).await?;
            print_ok(&report)
        }
        Command::Revectorize { paths } => {
            let paths: Vec<&Path> = paths.iter().map(|p| p.as_path()).collect();
            let report = ctx.revectorize(&paths).await?;
            print_ok(&report)
        }
        Command::Daemon { .. } | Command::DaemonWorker => unreachable!("daemon commands are handled before context construction"),
    }
}

/// Run the vectorization worker loop in the foreground until SIGTERM/Ctrl-C.
async fn run_daemon_worker(root: &Path, config: &crate::config::Config) -> ExitCode {
    let ctx = match build_context(root, config).await {
        Ok(ctx) => ctx,
        Err(err) => {
            error!(%err, "failed to initialize worker context");
            return ExitCode::FAILURE;
        }
    };
    let worker_ctx = crate::worker::WorkerContext {
        store: ctx.store,
        index: ctx.index,
        embedding: ctx.embedding,
        project_id: ctx.project_id,
        min_chunk_length: ctx.min_chunk_length,
        config: config.code_analysis.worker.clone(),
    };
    let (stop, mut handle) = crate::worker::spawn(worker_ctx);
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            stop.stop();
            let _ = handle.await;
        }
        result = &mut handle => {
            if let Err(err) = result {
                error!(%err, "worker task panicked");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

async fn run_search(ctx: &Context, kind: SearchCommand) -> Result<(), ErrorPayload> {
    match kind {
        SearchCommand::FindUsages { name, target_type, target_class } => {
            let hits = ctx.find_usages(&name, target_type.map(Into::into), target_class.as_deref()).await?;
            print_ok(&hits)
        }
        SearchCommand::Fulltext { query, entity_type, limit } => {
            let hits = ctx.full_text_search(&query, entity_type.as_deref(), limit).await?;
            print_ok(&hits)
        }
        SearchCommand::ClassMethods { class } => {
            let hits = ctx.search_methods(class.as_deref()).await?;
            print_ok(&hits)
        }
        SearchCommand::FindClasses { pattern } => {
            let hits = ctx.search_classes(&pattern).await?;
            print_ok(&hits)
        }
        SearchCommand::Semantic { query, k, max_distance } => {
            let options = SemanticSearchOptions {
                max_distance,
                source_type: None,
                file_path_substring: None,
            };
            let hits = ctx.semantic_search(&query, k, &options).await?;
            print_ok(&hits)
        }
    }
}

fn print_ok<T: serde::Serialize>(value: &T) -> Result<(), ErrorPayload> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(err) => Err(ErrorPayload::new(crate::orchestrator::ErrorCode::InvalidConfig, format!("failed to serialize result: {err}"))),
    }
}

fn print_error(err: &ErrorPayload) {
    match serde_json::to_string_pretty(err) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{err:?}"),
    }
}
