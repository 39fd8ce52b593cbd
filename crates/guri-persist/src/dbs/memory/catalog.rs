use async_trait::async_trait;
use chrono::{DateTime, Utc};

use guri_types::{Category, CategoryDraft, ResourceKey, Service, ServiceDraft};

use super::{MemoryPersistenceClient, Tables};
use crate::error::{PersistError, Result};
use crate::trait_client::{CategoryRepository, ServiceRepository};

pub(super) fn category_from_draft(id: i64, draft: CategoryDraft) -> Category {
    let slug = draft.effective_slug();
    Category {
        id,
        name: draft.name,
        slug,
        description: draft.description,
        icon: draft.icon,
    }
}

pub(super) fn service_from_draft(id: i64, draft: ServiceDraft, created_at: DateTime<Utc>) -> Service {
    Service {
        id,
        title: draft.title,
        description: draft.description,
        icon: draft.icon,
        created_at,
    }
}

impl Tables {
    fn check_category(&self, draft: &CategoryDraft, except: Option<i64>) -> Result<()> {
        let slug = draft.effective_slug();
        if self
            .categories
            .values()
            .any(|c| c.slug == slug && Some(c.id) != except)
        {
            return Err(PersistError::conflict("category", format!("slug '{}' is taken", slug)));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryPersistenceClient {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Category> = t.categories.values().cloned().collect();
        rows.sort_by_key(|c| c.name.to_lowercase());
        Ok(rows)
    }

    async fn get_category(&self, key: &ResourceKey) -> Result<Option<Category>> {
        let t = self.tables.read().await;
        let found = match key {
            ResourceKey::Id(id) => t.categories.get(id),
            ResourceKey::Slug(slug) => t.categories.values().find(|c| &c.slug == slug),
        };
        Ok(found.cloned())
    }

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category> {
        let mut t = self.tables.write().await;
        t.check_category(&draft, None)?;

        let id = t.allocate("categories");
        let category = category_from_draft(id, draft);
        t.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, draft: CategoryDraft) -> Result<Option<Category>> {
        let mut t = self.tables.write().await;
        if !t.categories.contains_key(&id) {
            return Ok(None);
        }
        t.check_category(&draft, Some(id))?;

        let category = category_from_draft(id, draft);
        t.categories.insert(id, category.clone());
        Ok(Some(category))
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for property in t.properties.values_mut() {
            if property.category_id == Some(id) {
                property.category_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ServiceRepository for MemoryPersistenceClient {
    async fn list_services(&self) -> Result<Vec<Service>> {
        let t = self.tables.read().await;
        Ok(t.services.values().cloned().collect())
    }

    async fn get_service(&self, id: i64) -> Result<Option<Service>> {
        let t = self.tables.read().await;
        Ok(t.services.get(&id).cloned())
    }

    async fn create_service(&self, draft: ServiceDraft) -> Result<Service> {
        let mut t = self.tables.write().await;
        let id = t.allocate("services");
        let service = service_from_draft(id, draft, Utc::now());
        t.services.insert(id, service.clone());
        Ok(service)
    }

    async fn update_service(&self, id: i64, draft: ServiceDraft) -> Result<Option<Service>> {
        let mut t = self.tables.write().await;
        let Some(created_at) = t.services.get(&id).map(|s| s.created_at) else {
            return Ok(None);
        };
        let service = service_from_draft(id, draft, created_at);
        t.services.insert(id, service.clone());
        Ok(Some(service))
    }

    async fn delete_service(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        Ok(t.services.remove(&id).is_some())
    }
}
