//! `analyze(root_dir, options) -> stats` (§4.10): walks a project directory,
//! parses every source file, and replaces its structural rows in the
//! store. Per-file failures become issues or are logged and skipped, never
//! propagated — batch analysis keeps moving (§7 propagation policy).

use crate::domain::analysis::{analyze_source, analyze_usages, FileAnalysis, IssueOwner};
use crate::domain::error::Result as DomainResult;
use crate::domain::ports::PersistentStore;
use crate::domain::types::{Class, CodeContent, Function, Import, Issue, Method, ProjectId, Usage};
use codeloom_tree_sitter_analysis::Cst;
use ignore::WalkBuilder;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Extension the analyzed language's source files carry.
pub const SOURCE_EXTENSION: &str = "py";

/// Caller-supplied knobs for one `analyze` call.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Dataset partition label to stamp on every file touched by this run.
    pub dataset: Option<String>,
    /// Human label for the project, used only when it is first created.
    pub project_label: Option<String>,
    /// Quality-issue threshold; falls back to the analyzer's default.
    pub max_file_lines: Option<u32>,
}

/// Aggregate counts returned by [`analyze`].
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct AnalyzeStats {
    pub files_analyzed: usize,
    pub files_skipped: usize,
    pub files_unchanged: usize,
    pub classes: usize,
    pub functions: usize,
    pub methods: usize,
    pub issues: usize,
}

/// Walk `root_dir`, (re-)analyze every changed source file, and persist
/// structural rows, AST snapshots, and quality issues.
pub async fn analyze(store: &dyn PersistentStore, root_dir: &Path, options: &AnalyzeOptions) -> DomainResult<AnalyzeStats> {
    let project_id = store
        .get_or_create_project(&root_dir.to_string_lossy(), options.project_label.as_deref().unwrap_or("unnamed"))
        .await?;

    let mut stats = AnalyzeStats::default();
    let max_file_lines = options.max_file_lines.unwrap_or(crate::domain::analysis::DEFAULT_MAX_FILE_LINES);

    for entry in WalkBuilder::new(root_dir).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "skipping directory entry: walk error");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }

        match analyze_one_file(store, project_id, root_dir, path, max_file_lines, options.dataset.as_deref()).await {
            Ok(Some(file_stats)) => {
                stats.files_analyzed += 1;
                stats.classes += file_stats.classes;
                stats.functions += file_stats.functions;
                stats.methods += file_stats.methods;
                stats.issues += file_stats.issues;
            }
            Ok(None) => stats.files_unchanged += 1,
            Err(err) => {
                warn!(file = %path.display(), %err, "skipping file: analysis failed");
                stats.files_skipped += 1;
            }
        }
    }

    Ok(stats)
}

struct FileStats {
    classes: usize,
    functions: usize,
    methods: usize,
    issues: usize,
}

async fn analyze_one_file(
    store: &dyn PersistentStore,
    project_id: ProjectId,
    root_dir: &Path,
    absolute_path: &Path,
    max_file_lines: u32,
    dataset: Option<&str>,
) -> DomainResult<Option<FileStats>> {
    let relative_path = absolute_path.strip_prefix(root_dir).unwrap_or(absolute_path).to_string_lossy().to_string();
    let metadata = std::fs::metadata(absolute_path)?;
    let mtime: chrono::DateTime<chrono::Utc> = metadata.modified()?.into();
    let source = std::fs::read_to_string(absolute_path)?;

    let cst = Cst::parse(&source)?;
    let analysis = analyze_source(&cst, max_file_lines);
    let usage_drafts = analyze_usages(&cst);

    let file_id = store
        .upsert_file(
            project_id,
            &relative_path,
            &absolute_path.to_string_lossy(),
            analysis.line_count,
            mtime,
            analysis.has_docstring,
            dataset,
        )
        .await?;

    if !store.is_ast_outdated(file_id, mtime).await? {
        debug!(file = %relative_path, "ast snapshot up to date, skipping re-ingest");
        return Ok(None);
    }

    store.clear_file_data(file_id).await?;

    let mut class_ids: HashMap<String, i64> = HashMap::new();
    let mut method_ids: HashMap<(String, String), i64> = HashMap::new();
    let mut function_ids: HashMap<String, i64> = HashMap::new();

    for class in &analysis.classes {
        let class_id = store
            .add_class(Class {
                id: 0,
                file_id,
                name: class.name.clone(),
                line: class.line,
                docstring: class.docstring.clone(),
                bases: class.bases.clone(),
            })
            .await?;
        class_ids.insert(class.name.clone(), class_id);
        for method in &class.methods {
            let method_id = store
                .add_method(Method {
                    id: 0,
                    class_id,
                    name: method.name.clone(),
                    line: method.line,
                    args: method.args.clone(),
                    docstring: method.docstring.clone(),
                    is_abstract: method.is_abstract,
                    body_is_only_no_op: method.body_is_only_no_op,
                    raises_not_implemented: method.raises_not_implemented,
                })
                .await?;
            method_ids.insert((class.name.clone(), method.name.clone()), method_id);
        }
    }
    for function in &analysis.functions {
        let function_id = store
            .add_function(Function {
                id: 0,
                file_id,
                name: function.name.clone(),
                line: function.line,
                args: function.args.clone(),
                docstring: function.docstring.clone(),
            })
            .await?;
        function_ids.insert(function.name.clone(), function_id);
    }
    for import in &analysis.imports {
        store
            .add_import(Import {
                id: 0,
                file_id,
                imported_name: import.imported_name.clone(),
                module_prefix: import.module_prefix.clone(),
                kind: import.kind,
                line: import.line,
            })
            .await?;
    }
    for usage in &usage_drafts {
        store
            .add_usage(Usage {
                id: 0,
                file_id,
                line: usage.line,
                kind: usage.kind,
                target_name: usage.target_name.clone(),
                target_class: usage.target_class.clone(),
                context: usage.context.clone(),
            })
            .await?;
    }
    for issue in &analysis.issues {
        let (class_id, method_id, function_id) = resolve_issue_owner(&issue.owner, &class_ids, &method_ids, &function_ids);
        store
            .add_issue(Issue {
                id: 0,
                file_id,
                kind: issue.kind.clone(),
                message: issue.message.clone(),
                line: issue.line,
                class_id,
                method_id,
                function_id,
                metadata: issue.metadata.clone(),
            })
            .await?;
    }
    for content in &analysis.code_contents {
        let entity_id = resolve_entity_id(content.entity_kind, &content.entity_name, &class_ids, &method_ids, &function_ids);
        store
            .add_code_content(CodeContent {
                file_id,
                entity_kind: content.entity_kind.to_string(),
                entity_name: content.entity_name.clone(),
                entity_id: entity_id.unwrap_or(file_id),
                raw_source: content.raw_source.clone(),
                docstring: content.docstring.clone(),
            })
            .await?;
    }

    let content_hash = format!("{:x}", Sha256::digest(source.as_bytes()));
    store.overwrite_ast_tree(file_id, project_id, source.as_bytes(), &content_hash, mtime).await?;

    Ok(Some(FileStats {
        classes: analysis.classes.len(),
        functions: analysis.functions.len(),
        methods: analysis.classes.iter().map(|c| c.methods.len()).sum(),
        issues: analysis.issues.len(),
    }))
}

fn resolve_issue_owner(
    owner: &IssueOwner,
    class_ids: &HashMap<String, i64>,
    method_ids: &HashMap<(String, String), i64>,
    function_ids: &HashMap<String, i64>,
) -> (Option<i64>, Option<i64>, Option<i64>) {
    match owner {
        IssueOwner::File => (None, None, None),
        IssueOwner::Class(name) => (class_ids.get(name).copied(), None, None),
        IssueOwner::Method { class, method } => (None, method_ids.get(&(class.clone(), method.clone())).copied(), None),
        IssueOwner::Function(name) => (None, None, function_ids.get(name).copied()),
    }
}

fn resolve_entity_id(
    entity_kind: &str,
    entity_name: &str,
    class_ids: &HashMap<String, i64>,
    method_ids: &HashMap<(String, String), i64>,
    function_ids: &HashMap<String, i64>,
) -> Option<i64> {
    match entity_kind {
        "class" => class_ids.get(entity_name).copied(),
        "function" => function_ids.get(entity_name).copied(),
        "method" => {
            let (class, method) = entity_name.split_once('.')?;
            method_ids.get(&(class.to_string(), method.to_string())).copied()
        }
        _ => None,
    }
}
