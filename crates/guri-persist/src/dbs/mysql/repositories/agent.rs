use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::{MySql, QueryBuilder};

use guri_types::{Agent, AgentDraft, AgentFilter, Page, User};

use super::{active, like_pattern};
use crate::dbs::mysql::client::MySqlPersistenceClient;
use crate::dbs::mysql::models::{AgentRow, AGENT_COLUMNS};
use crate::error::{PersistError, Result};
use crate::records::{normalize_email, NewUser};
use crate::trait_client::{AgentRepository, UserRepository};

/// Binds name through trubroker, in `AGENT_COLUMNS` order
fn bind_draft<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    draft: &'q AgentDraft,
    email: Option<String>,
) -> Query<'q, MySql, MySqlArguments> {
    query
        .bind(&draft.name)
        .bind(&draft.title)
        .bind(&draft.specialty)
        .bind(draft.rating)
        .bind(draft.reviews_count)
        .bind(&draft.languages)
        .bind(&draft.profile_photo)
        .bind(&draft.image)
        .bind(&draft.city)
        .bind(&draft.company)
        .bind(&draft.phone)
        .bind(&draft.whatsapp)
        .bind(email)
        .bind(draft.trubroker)
}

const INSERT_AGENT: &str = "INSERT INTO agents (name, title, specialty, rating, reviews_count, \
    languages, profile_photo, image, city, company, phone, whatsapp, email, trubroker, \
    user_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

impl MySqlPersistenceClient {
    async fn fetch_agent(&self, sql_where: &str, id: i64) -> Result<Option<Agent>> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {} FROM agents WHERE {} = ?",
            AGENT_COLUMNS, sql_where
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Agent::from))
    }

    async fn touch_agent(&self, id: i64, column: &str, value: String, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(&format!("UPDATE agents SET {} = ?, updated_at = ? WHERE id = ?", column))
            .bind(value)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AgentRepository for MySqlPersistenceClient {
    #[tracing::instrument(skip(self), err)]
    async fn list_agents(&self, filter: &AgentFilter, page: Page) -> Result<Vec<Agent>> {
        let mut qb =
            QueryBuilder::<MySql>::new(format!("SELECT {} FROM agents WHERE 1 = 1", AGENT_COLUMNS));

        if let Some(location) = active(&filter.location) {
            qb.push(" AND city LIKE ").push_bind(like_pattern(location));
        }
        if let Some(specialty) = active(&filter.specialty) {
            qb.push(" AND specialty LIKE ").push_bind(like_pattern(specialty));
        }
        if let Some(language) = active(&filter.language) {
            // languages is a comma-separated list; match whole entries only
            let needle = language.replace(' ', "");
            qb.push(" AND CONCAT(',', REPLACE(languages, ' ', ''), ',') LIKE ")
                .push_bind(like_pattern(&format!(",{},", needle)));
        }

        qb.push(" ORDER BY rating DESC, id ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<AgentRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Agent::from).collect())
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_agent(&self, id: i64) -> Result<Option<Agent>> {
        self.fetch_agent("id", id).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_agent_by_user(&self, user_id: i64) -> Result<Option<Agent>> {
        self.fetch_agent("user_id", user_id).await
    }

    #[tracing::instrument(skip(self, user, draft), fields(email = %user.email), err)]
    async fn create_agent_account(&self, user: NewUser, draft: AgentDraft) -> Result<(User, Agent)> {
        let now = Utc::now();
        let email = normalize_email(&user.email);
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| PersistError::on_write("user", e))?;
        let user_id = inserted.last_insert_id() as i64;

        let agent_email = draft.email.clone().unwrap_or_else(|| email.clone());
        let inserted = bind_draft(sqlx::query(INSERT_AGENT), &draft, Some(agent_email))
            .bind(user_id)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| PersistError::on_write("agent", e))?;
        let agent_id = inserted.last_insert_id() as i64;

        tx.commit().await?;
        tracing::info!(user_id, agent_id, "agent account created");

        let account = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("user {} missing after insert", user_id)))?;
        let agent = self
            .get_agent(agent_id)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("agent {} missing after insert", agent_id)))?;
        Ok((account, agent))
    }

    #[tracing::instrument(skip(self, draft), err)]
    async fn update_agent(&self, id: i64, draft: AgentDraft) -> Result<Option<Agent>> {
        let sql = "UPDATE agents SET name = ?, title = ?, specialty = ?, rating = ?, \
                   reviews_count = ?, languages = ?, profile_photo = ?, image = ?, city = ?, \
                   company = ?, phone = ?, whatsapp = ?, email = COALESCE(?, email), \
                   trubroker = ?, updated_at = ? WHERE id = ?";

        let email = draft.email.clone();
        bind_draft(sqlx::query(sql), &draft, email)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_agent(id).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn set_agent_photo(&self, id: i64, url: String) -> Result<Option<Agent>> {
        self.touch_agent(id, "profile_photo", url, Utc::now()).await?;
        self.get_agent(id).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_agent(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<Option<i64>> =
            sqlx::query_scalar("SELECT user_id FROM agents WHERE id = ? FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(user_id) = owner else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if let Some(user_id) = user_id {
            sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
