use async_trait::async_trait;
use chrono::Utc;

use guri_types::{Contact, ContactDraft, ContactStatus, Page};

use crate::dbs::mysql::client::MySqlPersistenceClient;
use crate::dbs::mysql::models::{convert_all, ContactRow, CONTACT_COLUMNS};
use crate::error::{PersistError, Result};
use crate::trait_client::ContactRepository;

#[async_trait]
impl ContactRepository for MySqlPersistenceClient {
    #[tracing::instrument(skip(self), err)]
    async fn list_contacts(&self, page: Page) -> Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {} FROM contacts ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            CONTACT_COLUMNS
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {} FROM contacts WHERE id = ?",
            CONTACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Contact::try_from).transpose()
    }

    #[tracing::instrument(skip(self, draft), err)]
    async fn create_contact(&self, draft: ContactDraft) -> Result<Contact> {
        let result = sqlx::query(
            "INSERT INTO contacts (name, email, phone, subject, message, property_id, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.subject)
        .bind(&draft.message)
        .bind(draft.property_id)
        .bind(ContactStatus::New.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| PersistError::on_write("contact", e))?;

        let id = result.last_insert_id() as i64;
        self.get_contact(id)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("contact {} missing after insert", id)))
    }

    #[tracing::instrument(skip(self), err)]
    async fn set_contact_status(&self, id: i64, status: ContactStatus) -> Result<Option<Contact>> {
        sqlx::query("UPDATE contacts SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.get_contact(id).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_contact(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
