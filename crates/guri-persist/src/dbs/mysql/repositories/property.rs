use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{MySql, QueryBuilder};

use guri_types::{Page, Property, PropertyDraft, PropertyFilter, ResourceKey};

use super::{like_pattern, push_range};
use crate::dbs::mysql::client::MySqlPersistenceClient;
use crate::dbs::mysql::models::{convert_all, PropertyRow, PROPERTY_COLUMNS};
use crate::error::{PersistError, Result};
use crate::trait_client::PropertyRepository;

/// Binds every draft column in `PROPERTY_COLUMNS` order (slug through agent_id)
fn bind_draft<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    slug: String,
    draft: &'q PropertyDraft,
) -> Query<'q, MySql, MySqlArguments> {
    query
        .bind(slug)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.currency)
        .bind(draft.purpose.as_wire())
        .bind(draft.property_type.as_str())
        .bind(&draft.location)
        .bind(&draft.city)
        .bind(&draft.region)
        .bind(draft.bedrooms)
        .bind(draft.bathrooms)
        .bind(draft.area)
        .bind(Json(&draft.images))
        .bind(draft.category_id)
        .bind(draft.featured)
        .bind(draft.agent_id)
}

impl MySqlPersistenceClient {
    async fn fetch_property(&self, id: i64) -> Result<Option<Property>> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            "SELECT {} FROM properties WHERE id = ?",
            PROPERTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Property::try_from).transpose()
    }
}

#[async_trait]
impl PropertyRepository for MySqlPersistenceClient {
    #[tracing::instrument(skip(self), err)]
    async fn list_properties(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>> {
        let mut qb = QueryBuilder::<MySql>::new(format!(
            "SELECT {} FROM properties WHERE purpose = ",
            PROPERTY_COLUMNS
        ));
        qb.push_bind(filter.purpose.as_wire());

        if let Some(location) = filter.active_location() {
            let pattern = like_pattern(location);
            qb.push(" AND (location LIKE ")
                .push_bind(pattern.clone())
                .push(" OR city LIKE ")
                .push_bind(pattern.clone())
                .push(" OR region LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(property_type) = filter.property_type {
            qb.push(" AND property_type = ").push_bind(property_type.as_str());
        }
        push_range(&mut qb, "bedrooms", filter.min_beds, filter.max_beds);
        push_range(&mut qb, "bathrooms", filter.min_baths, filter.max_baths);
        push_range(&mut qb, "price", filter.min_price, filter.max_price);
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(agent_id) = filter.agent_id {
            qb.push(" AND agent_id = ").push_bind(agent_id);
        }

        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<PropertyRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    #[tracing::instrument(skip(self), err)]
    async fn featured_properties(&self, limit: u32) -> Result<Vec<Property>> {
        let rows = sqlx::query_as::<_, PropertyRow>(&format!(
            "SELECT {} FROM properties WHERE featured = TRUE AND agent_id IS NOT NULL \
             ORDER BY created_at DESC, id DESC LIMIT ?",
            PROPERTY_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_property(&self, key: &ResourceKey) -> Result<Option<Property>> {
        match key {
            ResourceKey::Id(id) => self.fetch_property(*id).await,
            ResourceKey::Slug(slug) => {
                let row = sqlx::query_as::<_, PropertyRow>(&format!(
                    "SELECT {} FROM properties WHERE slug = ?",
                    PROPERTY_COLUMNS
                ))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
                row.map(Property::try_from).transpose()
            }
        }
    }

    #[tracing::instrument(skip(self, draft), fields(title = %draft.title), err)]
    async fn create_property(&self, draft: PropertyDraft) -> Result<Property> {
        let now = Utc::now();
        let sql = "INSERT INTO properties (slug, title, description, price, currency, purpose, \
                   property_type, location, city, region, bedrooms, bathrooms, area, images, \
                   category_id, featured, agent_id, created_at, updated_at) \
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

        let result = bind_draft(sqlx::query(sql), draft.effective_slug(), &draft)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistError::on_write("property", e))?;

        let id = result.last_insert_id() as i64;
        self.fetch_property(id)
            .await?
            .ok_or_else(|| PersistError::Internal(format!("property {} missing after insert", id)))
    }

    #[tracing::instrument(skip(self, draft), err)]
    async fn update_property(&self, id: i64, draft: PropertyDraft) -> Result<Option<Property>> {
        let sql = "UPDATE properties SET slug = ?, title = ?, description = ?, price = ?, \
                   currency = ?, purpose = ?, property_type = ?, location = ?, city = ?, \
                   region = ?, bedrooms = ?, bathrooms = ?, area = ?, images = ?, \
                   category_id = ?, featured = ?, agent_id = ?, updated_at = ? WHERE id = ?";

        bind_draft(sqlx::query(sql), draft.effective_slug(), &draft)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistError::on_write("property", e))?;

        self.fetch_property(id).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn add_property_images(&self, id: i64, urls: Vec<String>) -> Result<Option<Property>> {
        sqlx::query(
            "UPDATE properties SET images = JSON_MERGE_PRESERVE(images, ?), updated_at = ? WHERE id = ?",
        )
        .bind(Json(&urls))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.fetch_property(id).await
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete_property(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
