use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, QueryBuilder};

use guri_types::{Story, StoryDraft, StoryUpdate};

use crate::dbs::mysql::client::{story_expiry_sql, MySqlPersistenceClient};
use crate::dbs::mysql::models::{convert_all, StoryRow, STORY_SELECT};
use crate::error::{PersistError, Result};
use crate::trait_client::StoryRepository;

impl MySqlPersistenceClient {
    async fn select_stories(
        &self,
        agent_id: Option<i64>,
        live_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Story>> {
        let mut qb = QueryBuilder::<MySql>::new(STORY_SELECT);
        qb.push(" WHERE 1 = 1");
        if let Some(agent_id) = agent_id {
            qb.push(" AND s.agent_id = ").push_bind(agent_id);
        }
        if let Some(now) = live_at {
            qb.push(format!(" AND {} >= ", story_expiry_sql("s.")))
                .push_bind(now);
        }
        qb.push(" ORDER BY s.created_at DESC, s.id DESC");

        let rows: Vec<StoryRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }
}

#[async_trait]
impl StoryRepository for MySqlPersistenceClient {
    #[tracing::instrument(skip(self), err)]
    async fn list_stories(&self, live_at: Option<DateTime<Utc>>) -> Result<Vec<Story>> {
        self.select_stories(None, live_at).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_agent_stories(
        &self,
        agent_id: i64,
        live_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Story>> {
        self.select_stories(Some(agent_id), live_at).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_story(&self, id: i64) -> Result<Option<Story>> {
        let row = sqlx::query_as::<_, StoryRow>(&format!("{} WHERE s.id = ?", STORY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Story::try_from).transpose()
    }

    #[tracing::instrument(skip(self, draft), fields(agent_id = draft.agent_id), err)]
    async fn create_story(&self, draft: StoryDraft, created_at: DateTime<Utc>) -> Result<Story> {
        let result = sqlx::query(
            "INSERT INTO stories (agent_id, media_type, media_url, thumbnail_url, duration, created_at, expires_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(draft.agent_id)
        .bind(draft.media_type.as_str())
        .bind(&draft.media_url)
        .bind(&draft.thumbnail_url)
        .bind(draft.duration)
        .bind(created_at)
        .bind(created_at + self.story_ttl)
        .execute(&self.pool)
        .await
        .map_err(|e| PersistError::on_write("story", e))?;

        let id = result.last_insert_id() as i64;
        self.get_story(id)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("story {} missing after insert", id)))
    }

    #[tracing::instrument(skip(self), err)]
    async fn update_story(&self, id: i64, update: StoryUpdate) -> Result<Option<Story>> {
        sqlx::query(
            "UPDATE stories SET thumbnail_url = COALESCE(?, thumbnail_url), \
             duration = COALESCE(?, duration) WHERE id = ?",
        )
        .bind(&update.thumbnail_url)
        .bind(update.duration)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_story(id).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_story(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), err)]
    async fn purge_expired_stories(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(&format!(
            "DELETE FROM stories WHERE {} < ?",
            story_expiry_sql("")
        ))
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
