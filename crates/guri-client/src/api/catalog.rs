use reqwest::Method;

use guri_types::{Category, CategoryDraft, ResourceKey, Service, ServiceDraft};

use crate::client::GuriClient;
use crate::error::Result;

impl GuriClient {
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let builder = self.request(Method::GET, "/categories").await;
        self.send(builder).await
    }

    pub async fn category(&self, key: &ResourceKey) -> Result<Category> {
        let builder = self.request(Method::GET, &format!("/categories/{}", key)).await;
        self.send(builder).await
    }

    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Category> {
        let builder = self.authed(Method::POST, "/categories").await?.json(draft);
        self.send(builder).await
    }

    pub async fn update_category(&self, id: i64, draft: &CategoryDraft) -> Result<Category> {
        let builder = self
            .authed(Method::PUT, &format!("/categories/{}", id))
            .await?
            .json(draft);
        self.send(builder).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/categories/{}", id)).await?;
        self.send_empty(builder).await
    }

    pub async fn services(&self) -> Result<Vec<Service>> {
        let builder = self.request(Method::GET, "/services").await;
        self.send(builder).await
    }

    pub async fn service(&self, id: i64) -> Result<Service> {
        let builder = self.request(Method::GET, &format!("/services/{}", id)).await;
        self.send(builder).await
    }

    pub async fn create_service(&self, draft: &ServiceDraft) -> Result<Service> {
        let builder = self.authed(Method::POST, "/services").await?.json(draft);
        self.send(builder).await
    }

    pub async fn update_service(&self, id: i64, draft: &ServiceDraft) -> Result<Service> {
        let builder = self
            .authed(Method::PUT, &format!("/services/{}", id))
            .await?
            .json(draft);
        self.send(builder).await
    }

    pub async fn delete_service(&self, id: i64) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/services/{}", id)).await?;
        self.send_empty(builder).await
    }
}
