use reqwest::Method;

use guri_types::{
    Agent, AgentDraft, AgentFilter, Contact, ContactDraft, ContactStatus, ContactUpdate,
    NewAgentAccount, Page,
};

use super::{images_form, with_page, Upload};
use crate::client::GuriClient;
use crate::error::Result;

impl GuriClient {
    pub async fn agents(&self, filter: &AgentFilter, page: Page) -> Result<Vec<Agent>> {
        let query = with_page(filter.to_query_pairs(), page);
        let builder = self.request(Method::GET, "/agents").await.query(&query);
        self.send(builder).await
    }

    pub async fn agent(&self, id: i64) -> Result<Agent> {
        let builder = self.request(Method::GET, &format!("/agents/{}", id)).await;
        self.send(builder).await
    }

    /// Creates the agent's login together with the profile
    pub async fn create_agent(&self, account: &NewAgentAccount) -> Result<Agent> {
        let builder = self.authed(Method::POST, "/agents").await?.json(account);
        self.send(builder).await
    }

    pub async fn update_agent(&self, id: i64, draft: &AgentDraft) -> Result<Agent> {
        let builder = self
            .authed(Method::PUT, &format!("/agents/{}", id))
            .await?
            .json(draft);
        self.send(builder).await
    }

    pub async fn delete_agent(&self, id: i64) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/agents/{}", id)).await?;
        self.send_empty(builder).await
    }

    /// The first stored image becomes the profile photo
    pub async fn upload_agent_images(&self, id: i64, images: Vec<Upload>) -> Result<Vec<String>> {
        let builder = self
            .authed(Method::POST, &format!("/agents/{}/images", id))
            .await?
            .multipart(images_form(images)?);
        self.send(builder).await
    }

    /// Public contact form
    pub async fn submit_contact(&self, draft: &ContactDraft) -> Result<Contact> {
        let builder = self.request(Method::POST, "/contacts").await.json(draft);
        self.send(builder).await
    }

    pub async fn contacts(&self, page: Page) -> Result<Vec<Contact>> {
        let builder = self
            .authed(Method::GET, "/contacts")
            .await?
            .query(&page.to_query_pairs());
        self.send(builder).await
    }

    pub async fn contact(&self, id: i64) -> Result<Contact> {
        let builder = self.authed(Method::GET, &format!("/contacts/{}", id)).await?;
        self.send(builder).await
    }

    pub async fn set_contact_status(&self, id: i64, status: ContactStatus) -> Result<Contact> {
        let builder = self
            .authed(Method::PUT, &format!("/contacts/{}", id))
            .await?
            .json(&ContactUpdate { status });
        self.send(builder).await
    }

    pub async fn delete_contact(&self, id: i64) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/contacts/{}", id)).await?;
        self.send_empty(builder).await
    }
}
