//! Workout template service

use crate::error::{ClientError, ClientResult};
use crate::repositories::{Collection, DocumentRepository};
use chrono::{DateTime, Utc};
use neurolift_shared::{live, WorkoutTemplate};
use sqlx::SqlitePool;
use tracing::debug;

/// Longest accepted template name
const MAX_NAME_LEN: usize = 64;

/// Template service for business logic
pub struct TemplateService;

impl TemplateService {
    /// Save a new template. Blank exercise names are dropped.
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        exercises: Vec<String>,
        now: DateTime<Utc>,
    ) -> ClientResult<WorkoutTemplate> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Template name is required".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ClientError::Validation(format!(
                "Template name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        let exercises: Vec<String> = exercises
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if exercises.is_empty() {
            return Err(ClientError::Validation(
                "A template needs at least one exercise".to_string(),
            ));
        }

        let template = WorkoutTemplate::new(name, exercises, now);
        DocumentRepository::save(pool, Collection::Templates, &template).await?;

        debug!(template_id = %template.id, name = %template.name, "Template created");
        Ok(template)
    }

    /// Live templates, newest first
    pub async fn list(pool: &SqlitePool) -> ClientResult<Vec<WorkoutTemplate>> {
        let all: Vec<WorkoutTemplate> = DocumentRepository::load_all(pool, Collection::Templates).await?;
        let mut templates = live(&all);
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    pub async fn get(pool: &SqlitePool, id: &str) -> ClientResult<WorkoutTemplate> {
        DocumentRepository::load::<WorkoutTemplate>(pool, Collection::Templates, id)
            .await?
            .filter(|t| t.deleted_at.is_none())
            .ok_or_else(|| ClientError::NotFound(format!("template {}", id)))
    }

    /// Tombstone a template so the deletion syncs
    pub async fn delete(pool: &SqlitePool, id: &str, now: DateTime<Utc>) -> ClientResult<()> {
        let mut template = Self::get(pool, id).await?;
        template.deleted_at = Some(now);
        template.updated_at = Some(now);
        DocumentRepository::save(pool, Collection::Templates, &template).await?;

        debug!(template_id = %id, "Template deleted");
        Ok(())
    }
}
