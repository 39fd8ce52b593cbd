use reqwest::Method;

use guri_types::{
    Page, Project, ProjectDraft, ProjectFilter, Property, PropertyDraft, PropertyFilter, ResourceKey,
};

use super::{images_form, with_page, Upload};
use crate::client::GuriClient;
use crate::error::Result;

impl GuriClient {
    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    pub async fn properties(&self, filter: &PropertyFilter, page: Page) -> Result<Vec<Property>> {
        let query = with_page(filter.to_query_pairs(), page);
        let builder = self.request(Method::GET, "/properties").await.query(&query);
        self.send(builder).await
    }

    pub async fn featured_properties(&self, limit: u32) -> Result<Vec<Property>> {
        let builder = self
            .request(Method::GET, "/properties/featured")
            .await
            .query(&[("limit", limit)]);
        self.send(builder).await
    }

    /// By numeric id or slug
    pub async fn property(&self, key: &ResourceKey) -> Result<Property> {
        let builder = self.request(Method::GET, &format!("/properties/{}", key)).await;
        self.send(builder).await
    }

    pub async fn create_property(&self, draft: &PropertyDraft) -> Result<Property> {
        let builder = self.authed(Method::POST, "/properties").await?.json(draft);
        self.send(builder).await
    }

    pub async fn update_property(&self, id: i64, draft: &PropertyDraft) -> Result<Property> {
        let builder = self
            .authed(Method::PUT, &format!("/properties/{}", id))
            .await?
            .json(draft);
        self.send(builder).await
    }

    pub async fn delete_property(&self, id: i64) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/properties/{}", id)).await?;
        self.send_empty(builder).await
    }

    /// Returns the stored URLs in upload order
    pub async fn upload_property_images(&self, id: i64, images: Vec<Upload>) -> Result<Vec<String>> {
        let builder = self
            .authed(Method::POST, &format!("/properties/{}/images", id))
            .await?
            .multipart(images_form(images)?);
        self.send(builder).await
    }

    // ------------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------------

    /// Public listing behind the "new projects" pages
    pub async fn new_projects(&self, filter: &ProjectFilter, page: Page) -> Result<Vec<Project>> {
        let query = with_page(filter.to_query_pairs(), page);
        let builder = self.request(Method::GET, "/new-projects").await.query(&query);
        self.send(builder).await
    }

    pub async fn new_project(&self, key: &ResourceKey) -> Result<Project> {
        let builder = self.request(Method::GET, &format!("/new-projects/{}", key)).await;
        self.send(builder).await
    }

    /// Back-office listing; requires an admin session
    pub async fn projects(&self, filter: &ProjectFilter, page: Page) -> Result<Vec<Project>> {
        let query = with_page(filter.to_query_pairs(), page);
        let builder = self.authed(Method::GET, "/projects").await?.query(&query);
        self.send(builder).await
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project> {
        let builder = self.authed(Method::POST, "/projects").await?.json(draft);
        self.send(builder).await
    }

    pub async fn update_project(&self, id: i64, draft: &ProjectDraft) -> Result<Project> {
        let builder = self
            .authed(Method::PUT, &format!("/projects/{}", id))
            .await?
            .json(draft);
        self.send(builder).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/projects/{}", id)).await?;
        self.send_empty(builder).await
    }

    pub async fn upload_project_images(&self, id: i64, images: Vec<Upload>) -> Result<Vec<String>> {
        let builder = self
            .authed(Method::POST, &format!("/projects/{}/images", id))
            .await?
            .multipart(images_form(images)?);
        self.send(builder).await
    }
}
