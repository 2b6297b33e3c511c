//! Structural and full-text search operations (§4.10): thin pass-throughs
//! to the store, converting a domain error into the wire contract.

use super::errors::{ErrorCode, ErrorPayload, OrchestratorResult};
use crate::domain::ports::PersistentStore;
use crate::domain::types::{Class, CodeContent, Method, ProjectId, Usage, UsageKind};

/// Classes whose name matches `pattern` (substring, case-insensitive).
pub async fn search_classes(store: &dyn PersistentStore, project_id: ProjectId, pattern: &str) -> OrchestratorResult<Vec<Class>> {
    store.search_classes(project_id, pattern).await.map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))
}

/// Methods, optionally restricted to one class.
pub async fn search_methods(
    store: &dyn PersistentStore,
    project_id: ProjectId,
    class_name: Option<&str>,
) -> OrchestratorResult<Vec<Method>> {
    store.search_methods(project_id, class_name).await.map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))
}

/// Usage sites matching `name`.
pub async fn find_usages(
    store: &dyn PersistentStore,
    project_id: ProjectId,
    name: &str,
    target_type: Option<UsageKind>,
    target_class: Option<&str>,
) -> OrchestratorResult<Vec<Usage>> {
    store
        .find_usages(project_id, name, target_type, target_class)
        .await
        .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))
}

/// Full-text search over denormalized source segments.
pub async fn full_text_search(
    store: &dyn PersistentStore,
    project_id: ProjectId,
    query: &str,
    entity_kind: Option<&str>,
    limit: u32,
) -> OrchestratorResult<Vec<CodeContent>> {
    store
        .full_text_search(project_id, query, entity_kind, limit)
        .await
        .map_err(|err| ErrorPayload::from_domain(err, ErrorCode::CstQueryError))
}
