use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{MySql, QueryBuilder};

use guri_types::{Page, Project, ProjectDraft, ProjectFilter, ResourceKey};

use super::{active, like_pattern};
use crate::dbs::mysql::client::MySqlPersistenceClient;
use crate::dbs::mysql::models::{convert_all, ProjectRow, PROJECT_COLUMNS};
use crate::error::{PersistError, Result};
use crate::trait_client::ProjectRepository;

fn bind_draft<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    draft: &'q ProjectDraft,
) -> Query<'q, MySql, MySqlArguments> {
    query
        .bind(draft.effective_slug())
        .bind(&draft.name)
        .bind(&draft.developer)
        .bind(&draft.description)
        .bind(&draft.location)
        .bind(&draft.city)
        .bind(draft.status.as_str())
        .bind(draft.starting_price)
        .bind(&draft.currency)
        .bind(draft.completion_date)
        .bind(Json(&draft.images))
        .bind(draft.featured)
}

impl MySqlPersistenceClient {
    async fn fetch_project(&self, column: &str, value: ProjectLookup<'_>) -> Result<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE {} = ?", PROJECT_COLUMNS, column);
        let query = sqlx::query_as::<_, ProjectRow>(&sql);
        let row = match value {
            ProjectLookup::Id(id) => query.bind(id),
            ProjectLookup::Slug(slug) => query.bind(slug),
        }
        .fetch_optional(&self.pool)
        .await?;
        row.map(Project::try_from).transpose()
    }
}

enum ProjectLookup<'a> {
    Id(i64),
    Slug(&'a str),
}

#[async_trait]
impl ProjectRepository for MySqlPersistenceClient {
    #[tracing::instrument(skip(self), err)]
    async fn list_projects(&self, filter: &ProjectFilter, page: Page) -> Result<Vec<Project>> {
        let mut qb =
            QueryBuilder::<MySql>::new(format!("SELECT {} FROM projects WHERE 1 = 1", PROJECT_COLUMNS));

        if let Some(location) = active(&filter.location) {
            let pattern = like_pattern(location);
            qb.push(" AND (location LIKE ")
                .push_bind(pattern.clone())
                .push(" OR city LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }

        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<ProjectRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_project(&self, key: &ResourceKey) -> Result<Option<Project>> {
        match key {
            ResourceKey::Id(id) => self.fetch_project("id", ProjectLookup::Id(*id)).await,
            ResourceKey::Slug(slug) => self.fetch_project("slug", ProjectLookup::Slug(slug)).await,
        }
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name), err)]
    async fn create_project(&self, draft: ProjectDraft) -> Result<Project> {
        let now = Utc::now();
        let sql = "INSERT INTO projects (slug, name, developer, description, location, city, \
                   status, starting_price, currency, completion_date, images, featured, \
                   created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

        let result = bind_draft(sqlx::query(sql), &draft)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistError::on_write("project", e))?;

        let id = result.last_insert_id() as i64;
        self.fetch_project("id", ProjectLookup::Id(id))
            .await?
            .ok_or_else(|| PersistError::Internal(format!("project {} missing after insert", id)))
    }

    #[tracing::instrument(skip(self, draft), err)]
    async fn update_project(&self, id: i64, draft: ProjectDraft) -> Result<Option<Project>> {
        let sql = "UPDATE projects SET slug = ?, name = ?, developer = ?, description = ?, \
                   location = ?, city = ?, status = ?, starting_price = ?, currency = ?, \
                   completion_date = ?, images = ?, featured = ?, updated_at = ? WHERE id = ?";

        bind_draft(sqlx::query(sql), &draft)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistError::on_write("project", e))?;

        self.fetch_project("id", ProjectLookup::Id(id)).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn add_project_images(&self, id: i64, urls: Vec<String>) -> Result<Option<Project>> {
        sqlx::query(
            "UPDATE projects SET images = JSON_MERGE_PRESERVE(images, ?), updated_at = ? WHERE id = ?",
        )
        .bind(Json(&urls))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.fetch_project("id", ProjectLookup::Id(id)).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_project(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
