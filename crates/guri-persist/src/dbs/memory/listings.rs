use async_trait::async_trait;
use chrono::{DateTime, Utc};

use guri_types::{
    Page, Project, ProjectDraft, ProjectFilter, Property, PropertyDraft, PropertyFilter,
    ResourceKey,
};

use super::{newest_first, MemoryPersistenceClient, Tables};
use crate::error::{PersistError, Result};
use crate::trait_client::{ProjectRepository, PropertyRepository};

pub(super) fn property_from_draft(
    id: i64,
    draft: PropertyDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Property {
    let slug = draft.effective_slug();
    Property {
        id,
        slug,
        title: draft.title,
        description: draft.description,
        price: draft.price,
        currency: draft.currency,
        purpose: draft.purpose,
        property_type: draft.property_type,
        location: draft.location,
        city: draft.city,
        region: draft.region,
        bedrooms: draft.bedrooms,
        bathrooms: draft.bathrooms,
        area: draft.area,
        images: draft.images,
        category_id: draft.category_id,
        featured: draft.featured,
        agent_id: draft.agent_id,
        created_at,
        updated_at,
    }
}

pub(super) fn project_from_draft(
    id: i64,
    draft: ProjectDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Project {
    let slug = draft.effective_slug();
    Project {
        id,
        slug,
        name: draft.name,
        developer: draft.developer,
        description: draft.description,
        location: draft.location,
        city: draft.city,
        status: draft.status,
        starting_price: draft.starting_price,
        currency: draft.currency,
        completion_date: draft.completion_date,
        images: draft.images,
        featured: draft.featured,
        created_at,
        updated_at,
    }
}

impl Tables {
    fn check_property(&self, draft: &PropertyDraft, except: Option<i64>) -> Result<()> {
        let slug = draft.effective_slug();
        if self
            .properties
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except)
        {
            return Err(PersistError::conflict("property", format!("slug '{}' is taken", slug)));
        }
        self.require_agent("property", draft.agent_id)?;
        self.require_category("property", draft.category_id)
    }

    fn check_project(&self, draft: &ProjectDraft, except: Option<i64>) -> Result<()> {
        let slug = draft.effective_slug();
        if self
            .projects
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except)
        {
            return Err(PersistError::conflict("project", format!("slug '{}' is taken", slug)));
        }
        Ok(())
    }
}

#[async_trait]
impl PropertyRepository for MemoryPersistenceClient {
    async fn list_properties(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Property> = t
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        newest_first(&mut rows, |p| (p.created_at, p.id));
        Ok(page.apply(rows))
    }

    async fn featured_properties(&self, limit: u32) -> Result<Vec<Property>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Property> = t
            .properties
            .values()
            .filter(|p| p.is_featured())
            .cloned()
            .collect();
        newest_first(&mut rows, |p| (p.created_at, p.id));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn get_property(&self, key: &ResourceKey) -> Result<Option<Property>> {
        let t = self.tables.read().await;
        let found = match key {
            ResourceKey::Id(id) => t.properties.get(id),
            ResourceKey::Slug(slug) => t.properties.values().find(|p| &p.slug == slug),
        };
        Ok(found.cloned())
    }

    async fn create_property(&self, draft: PropertyDraft) -> Result<Property> {
        let mut t = self.tables.write().await;
        t.check_property(&draft, None)?;

        let id = t.allocate("properties");
        let now = Utc::now();
        let property = property_from_draft(id, draft, now, now);
        t.properties.insert(id, property.clone());
        Ok(property)
    }

    async fn update_property(&self, id: i64, draft: PropertyDraft) -> Result<Option<Property>> {
        let mut t = self.tables.write().await;
        let Some(created_at) = t.properties.get(&id).map(|p| p.created_at) else {
            return Ok(None);
        };
        t.check_property(&draft, Some(id))?;

        let property = property_from_draft(id, draft, created_at, Utc::now());
        t.properties.insert(id, property.clone());
        Ok(Some(property))
    }

    async fn add_property_images(&self, id: i64, urls: Vec<String>) -> Result<Option<Property>> {
        let mut t = self.tables.write().await;
        Ok(t.properties.get_mut(&id).map(|p| {
            p.images.extend(urls);
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_property(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        if t.properties.remove(&id).is_none() {
            return Ok(false);
        }
        for contact in t.contacts.values_mut() {
            if contact.property_id == Some(id) {
                contact.property_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ProjectRepository for MemoryPersistenceClient {
    async fn list_projects(&self, filter: &ProjectFilter, page: Page) -> Result<Vec<Project>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Project> = t
            .projects
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        newest_first(&mut rows, |p| (p.created_at, p.id));
        Ok(page.apply(rows))
    }

    async fn get_project(&self, key: &ResourceKey) -> Result<Option<Project>> {
        let t = self.tables.read().await;
        let found = match key {
            ResourceKey::Id(id) => t.projects.get(id),
            ResourceKey::Slug(slug) => t.projects.values().find(|p| &p.slug == slug),
        };
        Ok(found.cloned())
    }

    async fn create_project(&self, draft: ProjectDraft) -> Result<Project> {
        let mut t = self.tables.write().await;
        t.check_project(&draft, None)?;

        let id = t.allocate("projects");
        let now = Utc::now();
        let project = project_from_draft(id, draft, now, now);
        t.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: i64, draft: ProjectDraft) -> Result<Option<Project>> {
        let mut t = self.tables.write().await;
        let Some(created_at) = t.projects.get(&id).map(|p| p.created_at) else {
            return Ok(None);
        };
        t.check_project(&draft, Some(id))?;

        let project = project_from_draft(id, draft, created_at, Utc::now());
        t.projects.insert(id, project.clone());
        Ok(Some(project))
    }

    async fn add_project_images(&self, id: i64, urls: Vec<String>) -> Result<Option<Project>> {
        let mut t = self.tables.write().await;
        Ok(t.projects.get_mut(&id).map(|p| {
            p.images.extend(urls);
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_project(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        Ok(t.projects.remove(&id).is_some())
    }
}
