use async_trait::async_trait;
use chrono::Utc;

use guri_types::{Category, CategoryDraft, ResourceKey, Service, ServiceDraft};

use crate::dbs::mysql::client::MySqlPersistenceClient;
use crate::dbs::mysql::models::{CategoryRow, ServiceRow, CATEGORY_COLUMNS, SERVICE_COLUMNS};
use crate::error::{PersistError, Result};
use crate::trait_client::{CategoryRepository, ServiceRepository};

#[async_trait]
impl CategoryRepository for MySqlPersistenceClient {
    #[tracing::instrument(skip(self), err)]
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories ORDER BY name ASC",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_category(&self, key: &ResourceKey) -> Result<Option<Category>> {
        let query = match key {
            ResourceKey::Id(id) => sqlx::query_as::<_, CategoryRow>(&format!(
                "SELECT {} FROM categories WHERE id = ?",
                CATEGORY_COLUMNS
            ))
            .bind(*id)
            .fetch_optional(&self.pool)
            .await?,
            ResourceKey::Slug(slug) => sqlx::query_as::<_, CategoryRow>(&format!(
                "SELECT {} FROM categories WHERE slug = ?",
                CATEGORY_COLUMNS
            ))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?,
        };
        Ok(query.map(Category::from))
    }

    #[tracing::instrument(skip(self), err)]
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category> {
        let result = sqlx::query(
            "INSERT INTO categories (name, slug, description, icon) VALUES (?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(draft.effective_slug())
        .bind(&draft.description)
        .bind(&draft.icon)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistError::on_write("category", e))?;

        let id = result.last_insert_id() as i64;
        self.get_category(&ResourceKey::Id(id))
            .await?
            .ok_or_else(|| PersistError::Internal(format!("category {} missing after insert", id)))
    }

    #[tracing::instrument(skip(self), err)]
    async fn update_category(&self, id: i64, draft: CategoryDraft) -> Result<Option<Category>> {
        sqlx::query("UPDATE categories SET name = ?, slug = ?, description = ?, icon = ? WHERE id = ?")
            .bind(&draft.name)
            .bind(draft.effective_slug())
            .bind(&draft.description)
            .bind(&draft.icon)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistError::on_write("category", e))?;

        self.get_category(&ResourceKey::Id(id)).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_category(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ServiceRepository for MySqlPersistenceClient {
    #[tracing::instrument(skip(self), err)]
    async fn list_services(&self) -> Result<Vec<Service>> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {} FROM services ORDER BY id ASC",
            SERVICE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_service(&self, id: i64) -> Result<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {} FROM services WHERE id = ?",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Service::from))
    }

    #[tracing::instrument(skip(self), err)]
    async fn create_service(&self, draft: ServiceDraft) -> Result<Service> {
        let result = sqlx::query(
            "INSERT INTO services (title, description, icon, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.icon)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistError::on_write("service", e))?;

        let id = result.last_insert_id() as i64;
        self.get_service(id)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("service {} missing after insert", id)))
    }

    #[tracing::instrument(skip(self), err)]
    async fn update_service(&self, id: i64, draft: ServiceDraft) -> Result<Option<Service>> {
        sqlx::query("UPDATE services SET title = ?, description = ?, icon = ? WHERE id = ?")
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.icon)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_service(id).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_service(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
