//! Resolves a [`ChunkDraft`]'s [`Owner`] (by name, as extracted from the
//! CST) to the row id the store assigned when the structural analyzer
//! inserted that class/method — so the persisted chunk can carry
//! `owner_id`.
//!
//! The store only exposes name-based lookups for classes and methods
//! (`search_classes`, `search_methods`); there is no equivalent for
//! top-level functions, so [`Owner::Function`] always resolves to `None`.
//! This mirrors the structural search surface the orchestrator exposes
//! (§4.10) rather than adding a store operation with no other caller.

use crate::domain::chunking::Owner;
use crate::domain::error::Result;
use crate::domain::ports::PersistentStore;
use crate::domain::types::{FileId, ProjectId};

/// Resolve `owner` to the class/method row id it refers to within `file_id`,
/// or `None` if it cannot be resolved (file-level prose, a function, or a
/// name with no matching structural row).
pub async fn resolve_owner_id(
    store: &dyn PersistentStore,
    project_id: ProjectId,
    file_id: FileId,
    owner: &Owner,
) -> Result<Option<i64>> {
    match owner {
        Owner::File | Owner::Function(_) => Ok(None),
        Owner::Class(name) => Ok(find_class_id(store, project_id, file_id, name).await?),
        Owner::Method { class, method } => {
            let Some(class_id) = find_class_id(store, project_id, file_id, class).await? else {
                return Ok(None);
            };
            let methods = store.search_methods(project_id, Some(class)).await?;
            Ok(methods.into_iter().find(|m| m.class_id == class_id && &m.name == method).map(|m| m.id))
        }
    }
}

async fn find_class_id(store: &dyn PersistentStore, project_id: ProjectId, file_id: FileId, name: &str) -> Result<Option<i64>> {
    let classes = store.search_classes(project_id, name).await?;
    Ok(classes.into_iter().find(|c| c.file_id == file_id && c.name == name).map(|c| c.id))
}
