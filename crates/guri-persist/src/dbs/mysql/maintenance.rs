//! Operator tasks behind the `guri-db` binary: create tables, drop every table,
//! and upsert the demo fixtures.

use chrono::Utc;
use serde::Serialize;
use sqlx::mysql::MySqlPool;
use sqlx::types::Json;

use crate::error::Result;
use crate::fixtures::{Fixtures, SeedAccounts, SeedReport};
use crate::records::normalize_email;
use super::schema;

/// Create any missing tables; returns how many statements ran
#[tracing::instrument(skip(pool), err)]
pub async fn migrate(pool: &MySqlPool) -> Result<usize> {
    for (table, ddl) in schema::TABLES {
        sqlx::query(&schema::create_statement(ddl))
            .execute(pool)
            .await?;
        tracing::debug!(table, "table ensured");
    }
    Ok(schema::TABLES.len())
}

#[derive(Debug, Default, Serialize)]
pub struct PruneReport {
    pub dropped: Vec<String>,
    /// `(table, error)` for every drop that failed
    pub failed: Vec<(String, String)>,
    /// False when foreign-key checks could not be switched back on
    pub fk_checks_restored: bool,
}

impl PruneReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.fk_checks_restored
    }
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Drop every table in the connected schema.
///
/// Foreign-key checks are a session setting, so the whole run holds a single
/// connection. Drops are not transactional: a failure part-way leaves the earlier
/// drops in place, and FK checks are switched back on regardless.
#[tracing::instrument(skip(pool), err)]
pub async fn prune(pool: &MySqlPool) -> Result<PruneReport> {
    let mut conn = pool.acquire().await?;
    let mut report = PruneReport::default();

    sqlx::query("SET FOREIGN_KEY_CHECKS = 0")
        .execute(&mut *conn)
        .await?;

    let tables: std::result::Result<Vec<String>, sqlx::Error> = sqlx::query_scalar(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'",
    )
    .fetch_all(&mut *conn)
    .await;

    match tables {
        Ok(tables) => {
            for table in tables {
                let drop = format!("DROP TABLE IF EXISTS {}", quote_identifier(&table));
                match sqlx::query(&drop).execute(&mut *conn).await {
                    Ok(_) => {
                        tracing::info!(table = %table, "dropped");
                        report.dropped.push(table);
                    }
                    Err(e) => {
                        tracing::error!(table = %table, error = %e, "drop failed");
                        report.failed.push((table, e.to_string()));
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "could not list tables");
            report.failed.push(("information_schema.tables".to_string(), e.to_string()));
        }
    }

    match sqlx::query("SET FOREIGN_KEY_CHECKS = 1")
        .execute(&mut *conn)
        .await
    {
        Ok(_) => report.fk_checks_restored = true,
        Err(e) => tracing::warn!(error = %e, "failed to re-enable foreign key checks"),
    }

    Ok(report)
}

/// Upsert the fixtures by primary key, parents before children, in one transaction
#[tracing::instrument(skip_all, err)]
pub async fn seed(pool: &MySqlPool, fixtures: &Fixtures, accounts: &SeedAccounts) -> Result<SeedReport> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for seeded in &fixtures.users {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE name = VALUES(name), email = VALUES(email), \
             password_hash = VALUES(password_hash), role = VALUES(role)",
        )
        .bind(seeded.id)
        .bind(&seeded.name)
        .bind(normalize_email(&seeded.email))
        .bind(fixtures.password_hash_for(seeded.role, accounts))
        .bind(seeded.role.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    for seeded in &fixtures.categories {
        let c = &seeded.row;
        sqlx::query(
            "INSERT INTO categories (id, name, slug, description, icon) VALUES (?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE name = VALUES(name), slug = VALUES(slug), \
             description = VALUES(description), icon = VALUES(icon)",
        )
        .bind(seeded.id)
        .bind(&c.name)
        .bind(c.effective_slug())
        .bind(&c.description)
        .bind(&c.icon)
        .execute(&mut *tx)
        .await?;
    }

    for seeded in &fixtures.services {
        let s = &seeded.row;
        sqlx::query(
            "INSERT INTO services (id, title, description, icon, created_at) VALUES (?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE title = VALUES(title), description = VALUES(description), \
             icon = VALUES(icon)",
        )
        .bind(seeded.id)
        .bind(&s.title)
        .bind(&s.description)
        .bind(&s.icon)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    for seeded in &fixtures.agents {
        let a = &seeded.draft;
        let email = a.email.clone().or_else(|| {
            fixtures
                .users
                .iter()
                .find(|u| u.id == seeded.user_id)
                .map(|u| normalize_email(&u.email))
        });
        sqlx::query(
            "INSERT INTO agents (id, user_id, name, title, specialty, rating, reviews_count, languages, \
             profile_photo, image, city, company, phone, whatsapp, email, trubroker, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE user_id = VALUES(user_id), name = VALUES(name), title = VALUES(title), \
             specialty = VALUES(specialty), rating = VALUES(rating), reviews_count = VALUES(reviews_count), \
             languages = VALUES(languages), image = VALUES(image), city = VALUES(city), \
             company = VALUES(company), phone = VALUES(phone), whatsapp = VALUES(whatsapp), \
             email = VALUES(email), trubroker = VALUES(trubroker), updated_at = VALUES(updated_at)",
        )
        .bind(seeded.id)
        .bind(seeded.user_id)
        .bind(&a.name)
        .bind(&a.title)
        .bind(&a.specialty)
        .bind(a.rating)
        .bind(a.reviews_count)
        .bind(&a.languages)
        .bind(&a.profile_photo)
        .bind(&a.image)
        .bind(&a.city)
        .bind(&a.company)
        .bind(&a.phone)
        .bind(&a.whatsapp)
        .bind(email)
        .bind(a.trubroker)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    for seeded in &fixtures.properties {
        let p = &seeded.row;
        sqlx::query(
            "INSERT INTO properties (id, slug, title, description, price, currency, purpose, property_type, \
             location, city, region, bedrooms, bathrooms, area, images, category_id, featured, agent_id, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE slug = VALUES(slug), title = VALUES(title), \
             description = VALUES(description), price = VALUES(price), currency = VALUES(currency), \
             purpose = VALUES(purpose), property_type = VALUES(property_type), location = VALUES(location), \
             city = VALUES(city), region = VALUES(region), bedrooms = VALUES(bedrooms), \
             bathrooms = VALUES(bathrooms), area = VALUES(area), images = VALUES(images), \
             category_id = VALUES(category_id), featured = VALUES(featured), agent_id = VALUES(agent_id), \
             updated_at = VALUES(updated_at)",
        )
        .bind(seeded.id)
        .bind(p.effective_slug())
        .bind(&p.title)
        .bind(&p.description)
        .bind(p.price)
        .bind(&p.currency)
        .bind(p.purpose.as_wire())
        .bind(p.property_type.as_str())
        .bind(&p.location)
        .bind(&p.city)
        .bind(&p.region)
        .bind(p.bedrooms)
        .bind(p.bathrooms)
        .bind(p.area)
        .bind(Json(&p.images))
        .bind(p.category_id)
        .bind(p.featured)
        .bind(p.agent_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    for seeded in &fixtures.projects {
        let p = &seeded.row;
        sqlx::query(
            "INSERT INTO projects (id, slug, name, developer, description, location, city, status, \
             starting_price, currency, completion_date, images, featured, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE slug = VALUES(slug), name = VALUES(name), developer = VALUES(developer), \
             description = VALUES(description), location = VALUES(location), city = VALUES(city), \
             status = VALUES(status), starting_price = VALUES(starting_price), currency = VALUES(currency), \
             completion_date = VALUES(completion_date), images = VALUES(images), featured = VALUES(featured), \
             updated_at = VALUES(updated_at)",
        )
        .bind(seeded.id)
        .bind(p.effective_slug())
        .bind(&p.name)
        .bind(&p.developer)
        .bind(&p.description)
        .bind(&p.location)
        .bind(&p.city)
        .bind(p.status.as_str())
        .bind(p.starting_price)
        .bind(&p.currency)
        .bind(p.completion_date)
        .bind(Json(&p.images))
        .bind(p.featured)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    let report = fixtures.report();
    tracing::info!(?report, "fixtures seeded");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_prune_report_clean() {
        let mut report = PruneReport {
            fk_checks_restored: true,
            ..Default::default()
        };
        assert!(report.is_clean());
        report.failed.push(("stories".to_string(), "lock wait timeout".to_string()));
        assert!(!report.is_clean());
    }
}
