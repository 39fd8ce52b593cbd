use async_trait::async_trait;
use chrono::{DateTime, Utc};

use guri_types::{Page, User};

use crate::dbs::mysql::client::MySqlPersistenceClient;
use crate::dbs::mysql::models::{convert_all, UserRow, USER_COLUMNS};
use crate::error::{PersistError, Result};
use crate::records::{normalize_email, NewUser, UserCredentials};
use crate::trait_client::UserRepository;

#[async_trait]
impl UserRepository for MySqlPersistenceClient {
    #[tracing::instrument(skip(self, user), fields(email = %user.email), err)]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistError::on_write("user", e))?;

        let id = result.last_insert_id() as i64;
        self.get_user(id)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("user {} missing after insert", id)))
    }

    #[tracing::instrument(skip(self), err)]
    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserCredentials::try_from).transpose()
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row
            .map(UserCredentials::try_from)
            .transpose()?
            .map(|credentials| credentials.user))
    }

    #[tracing::instrument(skip(self), err)]
    async fn list_users(&self, page: Page) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id ASC LIMIT ? OFFSET ?",
            USER_COLUMNS
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let credentials: Vec<UserCredentials> = convert_all(rows)?;
        Ok(credentials.into_iter().map(|c| c.user).collect())
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, password_hash), err)]
    async fn set_password_hash(&self, user_id: i64, password_hash: String) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, token_hash), err)]
    async fn store_reset_token(
        &self,
        user_id: i64,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at, used, created_at) \
             VALUES (?, ?, ?, FALSE, ?)",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistError::on_write("password_reset_token", e))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, token_hash), err)]
    async fn redeem_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let token: Option<(i64, i64)> = sqlx::query_as(
            "SELECT id, user_id FROM password_reset_tokens \
             WHERE token_hash = ? AND used = FALSE AND expires_at > ? FOR UPDATE",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((token_id, user_id)) = token else {
            return Ok(None);
        };

        sqlx::query("UPDATE password_reset_tokens SET used = TRUE WHERE id = ?")
            .bind(token_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(user_id))
    }
}
