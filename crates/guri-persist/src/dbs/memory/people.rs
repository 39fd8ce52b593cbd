use async_trait::async_trait;
use chrono::{DateTime, Utc};

use guri_types::{
    Agent, AgentDraft, AgentFilter, Contact, ContactDraft, ContactStatus, Page, User,
};

use super::{newest_first, MemoryPersistenceClient};
use crate::error::{PersistError, Result};
use crate::records::{normalize_email, NewUser, PasswordResetToken, UserCredentials};
use crate::trait_client::{AgentRepository, ContactRepository, UserRepository};

pub(super) fn agent_from_draft(
    id: i64,
    user_id: Option<i64>,
    draft: AgentDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Agent {
    Agent {
        id,
        user_id,
        name: draft.name,
        title: draft.title,
        specialty: draft.specialty,
        rating: draft.rating,
        reviews_count: draft.reviews_count,
        languages: draft.languages,
        profile_photo: draft.profile_photo,
        image: draft.image,
        city: draft.city,
        company: draft.company,
        phone: draft.phone,
        whatsapp: draft.whatsapp,
        email: draft.email,
        trubroker: draft.trubroker,
        created_at,
        updated_at,
    }
}

#[async_trait]
impl AgentRepository for MemoryPersistenceClient {
    async fn list_agents(&self, filter: &AgentFilter, page: Page) -> Result<Vec<Agent>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Agent> = t
            .agents
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.rating.total_cmp(&a.rating).then(a.id.cmp(&b.id)));
        Ok(page.apply(rows))
    }

    async fn get_agent(&self, id: i64) -> Result<Option<Agent>> {
        let t = self.tables.read().await;
        Ok(t.agents.get(&id).cloned())
    }

    async fn find_agent_by_user(&self, user_id: i64) -> Result<Option<Agent>> {
        let t = self.tables.read().await;
        Ok(t.agents.values().find(|a| a.user_id == Some(user_id)).cloned())
    }

    async fn create_agent_account(&self, user: NewUser, draft: AgentDraft) -> Result<(User, Agent)> {
        let mut t = self.tables.write().await;
        let email = normalize_email(&user.email);
        if t.email_taken(&email, None) {
            return Err(PersistError::conflict("user", format!("email '{}' is registered", email)));
        }

        let now = Utc::now();
        let user_id = t.allocate("users");
        let account = User {
            id: user_id,
            name: user.name,
            email: email.clone(),
            role: user.role,
            created_at: now,
        };
        t.users.insert(
            user_id,
            UserCredentials {
                user: account.clone(),
                password_hash: user.password_hash,
            },
        );

        let agent_id = t.allocate("agents");
        let mut agent = agent_from_draft(agent_id, Some(user_id), draft, now, now);
        if agent.email.is_none() {
            agent.email = Some(email);
        }
        t.agents.insert(agent_id, agent.clone());

        Ok((account, agent))
    }

    async fn update_agent(&self, id: i64, draft: AgentDraft) -> Result<Option<Agent>> {
        let mut t = self.tables.write().await;
        let Some(existing) = t.agents.get(&id) else {
            return Ok(None);
        };
        let kept_email = existing.email.clone();
        let mut agent = agent_from_draft(id, existing.user_id, draft, existing.created_at, Utc::now());
        if agent.email.is_none() {
            agent.email = kept_email;
        }
        t.agents.insert(id, agent.clone());
        Ok(Some(agent))
    }

    async fn set_agent_photo(&self, id: i64, url: String) -> Result<Option<Agent>> {
        let mut t = self.tables.write().await;
        Ok(t.agents.get_mut(&id).map(|a| {
            a.profile_photo = Some(url);
            a.updated_at = Utc::now();
            a.clone()
        }))
    }

    async fn delete_agent(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        let Some(agent) = t.agents.remove(&id) else {
            return Ok(false);
        };
        t.detach_agent(id);
        if let Some(user_id) = agent.user_id {
            t.remove_user(user_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for MemoryPersistenceClient {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.tables.write().await;
        let email = normalize_email(&user.email);
        if t.email_taken(&email, None) {
            return Err(PersistError::conflict("user", format!("email '{}' is registered", email)));
        }

        let id = t.allocate("users");
        let account = User {
            id,
            name: user.name,
            email,
            role: user.role,
            created_at: Utc::now(),
        };
        t.users.insert(
            id,
            UserCredentials {
                user: account.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(account)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let t = self.tables.read().await;
        let email = normalize_email(email);
        Ok(t.users.values().find(|c| c.user.email == email).cloned())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.get(&id).map(|c| c.user.clone()))
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>> {
        let t = self.tables.read().await;
        let rows: Vec<User> = t.users.values().map(|c| c.user.clone()).collect();
        Ok(page.apply(rows))
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        if !t.remove_user(id) {
            return Ok(false);
        }
        let owned: Vec<i64> = t
            .agents
            .values()
            .filter(|a| a.user_id == Some(id))
            .map(|a| a.id)
            .collect();
        for agent_id in owned {
            t.agents.remove(&agent_id);
            t.detach_agent(agent_id);
        }
        Ok(true)
    }

    async fn set_password_hash(&self, user_id: i64, password_hash: String) -> Result<bool> {
        let mut t = self.tables.write().await;
        Ok(t
            .users
            .get_mut(&user_id)
            .map(|c| c.password_hash = password_hash)
            .is_some())
    }

    async fn store_reset_token(
        &self,
        user_id: i64,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(PersistError::missing_reference(
                "password_reset_token",
                format!("user {} does not exist", user_id),
            ));
        }
        t.reset_tokens.push(PasswordResetToken {
            user_id,
            token_hash,
            expires_at,
            used: false,
        });
        Ok(())
    }

    async fn redeem_reset_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<i64>> {
        let mut t = self.tables.write().await;
        Ok(t
            .reset_tokens
            .iter_mut()
            .find(|token| token.token_hash == token_hash && token.is_redeemable(now))
            .map(|token| {
                token.used = true;
                token.user_id
            }))
    }
}

#[async_trait]
impl ContactRepository for MemoryPersistenceClient {
    async fn list_contacts(&self, page: Page) -> Result<Vec<Contact>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Contact> = t.contacts.values().cloned().collect();
        newest_first(&mut rows, |c| (c.created_at, c.id));
        Ok(page.apply(rows))
    }

    async fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
        let t = self.tables.read().await;
        Ok(t.contacts.get(&id).cloned())
    }

    async fn create_contact(&self, draft: ContactDraft) -> Result<Contact> {
        let mut t = self.tables.write().await;
        t.require_property("contact", draft.property_id)?;

        let id = t.allocate("contacts");
        let contact = Contact {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            subject: draft.subject,
            message: draft.message,
            property_id: draft.property_id,
            status: ContactStatus::New,
            created_at: Utc::now(),
        };
        t.contacts.insert(id, contact.clone());
        Ok(contact)
    }

    async fn set_contact_status(&self, id: i64, status: ContactStatus) -> Result<Option<Contact>> {
        let mut t = self.tables.write().await;
        Ok(t.contacts.get_mut(&id).map(|c| {
            c.status = status;
            c.clone()
        }))
    }

    async fn delete_contact(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.write().await;
        Ok(t.contacts.remove(&id).is_some())
    }
}
