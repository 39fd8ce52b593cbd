use reqwest::Method;

use guri_types::{Page, PurgeReport, StoreStats, Story, User};

use crate::client::GuriClient;
use crate::error::Result;

impl GuriClient {
    pub async fn admin_stats(&self) -> Result<StoreStats> {
        let builder = self.authed(Method::GET, "/admin/stats").await?;
        self.send(builder).await
    }

    pub async fn admin_users(&self, page: Page) -> Result<Vec<User>> {
        let builder = self
            .authed(Method::GET, "/admin/users")
            .await?
            .query(&page.to_query_pairs());
        self.send(builder).await
    }

    pub async fn admin_delete_user(&self, id: i64) -> Result<()> {
        let builder = self.authed(Method::DELETE, &format!("/admin/users/{}", id)).await?;
        self.send_empty(builder).await
    }

    /// Every story, expired ones included
    pub async fn admin_stories(&self) -> Result<Vec<Story>> {
        let builder = self.authed(Method::GET, "/admin/stories").await?;
        self.send(builder).await
    }

    pub async fn admin_purge_expired_stories(&self) -> Result<u64> {
        let builder = self.authed(Method::POST, "/admin/stories/purge").await?;
        let report: PurgeReport = self.send(builder).await?;
        Ok(report.purged)
    }
}
