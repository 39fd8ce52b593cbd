//! Table definitions, in foreign-key dependency order.

const TABLE_OPTIONS: &str = "ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci";

const USERS: &str = "CREATE TABLE IF NOT EXISTS users (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    role VARCHAR(16) NOT NULL DEFAULT 'user',
    created_at DATETIME(6) NOT NULL,
    UNIQUE KEY uq_users_email (email)
)";

const CATEGORIES: &str = "CREATE TABLE IF NOT EXISTS categories (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(255) NOT NULL,
    description TEXT NULL,
    icon VARCHAR(255) NULL,
    UNIQUE KEY uq_categories_slug (slug)
)";

const AGENTS: &str = "CREATE TABLE IF NOT EXISTS agents (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    user_id BIGINT NULL,
    name VARCHAR(255) NOT NULL,
    title VARCHAR(255) NULL,
    specialty VARCHAR(255) NULL,
    rating DOUBLE NOT NULL DEFAULT 0,
    reviews_count INT UNSIGNED NOT NULL DEFAULT 0,
    languages VARCHAR(512) NOT NULL DEFAULT '',
    profile_photo VARCHAR(1024) NULL,
    image VARCHAR(1024) NULL,
    city VARCHAR(255) NULL,
    company VARCHAR(255) NULL,
    phone VARCHAR(64) NULL,
    whatsapp VARCHAR(64) NULL,
    email VARCHAR(255) NULL,
    trubroker BOOLEAN NOT NULL DEFAULT FALSE,
    created_at DATETIME(6) NOT NULL,
    updated_at DATETIME(6) NOT NULL,
    UNIQUE KEY uq_agents_user (user_id),
    KEY idx_agents_rating (rating),
    CONSTRAINT fk_agents_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
)";

const SERVICES: &str = "CREATE TABLE IF NOT EXISTS services (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT NULL,
    icon VARCHAR(255) NULL,
    created_at DATETIME(6) NOT NULL
)";

const PROPERTIES: &str = "CREATE TABLE IF NOT EXISTS properties (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    slug VARCHAR(255) NOT NULL,
    title VARCHAR(255) NOT NULL,
    description TEXT NULL,
    price BIGINT NOT NULL DEFAULT 0,
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    purpose VARCHAR(8) NOT NULL,
    property_type VARCHAR(32) NOT NULL,
    location VARCHAR(255) NOT NULL,
    city VARCHAR(255) NOT NULL,
    region VARCHAR(255) NULL,
    bedrooms INT UNSIGNED NOT NULL DEFAULT 0,
    bathrooms INT UNSIGNED NOT NULL DEFAULT 0,
    area DOUBLE NULL,
    images JSON NOT NULL,
    category_id BIGINT NULL,
    featured BOOLEAN NOT NULL DEFAULT FALSE,
    agent_id BIGINT NULL,
    created_at DATETIME(6) NOT NULL,
    updated_at DATETIME(6) NOT NULL,
    UNIQUE KEY uq_properties_slug (slug),
    KEY idx_properties_purpose_created (purpose, created_at),
    KEY idx_properties_city (city),
    CONSTRAINT fk_properties_agent FOREIGN KEY (agent_id) REFERENCES agents (id) ON DELETE SET NULL,
    CONSTRAINT fk_properties_category FOREIGN KEY (category_id) REFERENCES categories (id) ON DELETE SET NULL
)";

const PROJECTS: &str = "CREATE TABLE IF NOT EXISTS projects (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    slug VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    developer VARCHAR(255) NOT NULL,
    description TEXT NULL,
    location VARCHAR(255) NOT NULL,
    city VARCHAR(255) NOT NULL,
    status VARCHAR(32) NOT NULL DEFAULT 'planned',
    starting_price BIGINT NULL,
    currency CHAR(3) NOT NULL DEFAULT 'USD',
    completion_date DATE NULL,
    images JSON NOT NULL,
    featured BOOLEAN NOT NULL DEFAULT FALSE,
    created_at DATETIME(6) NOT NULL,
    updated_at DATETIME(6) NOT NULL,
    UNIQUE KEY uq_projects_slug (slug)
)";

const CONTACTS: &str = "CREATE TABLE IF NOT EXISTS contacts (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    phone VARCHAR(64) NULL,
    subject VARCHAR(255) NULL,
    message TEXT NOT NULL,
    property_id BIGINT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'new',
    created_at DATETIME(6) NOT NULL,
    KEY idx_contacts_created (created_at),
    CONSTRAINT fk_contacts_property FOREIGN KEY (property_id) REFERENCES properties (id) ON DELETE SET NULL
)";

const STORIES: &str = "CREATE TABLE IF NOT EXISTS stories (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    agent_id BIGINT NOT NULL,
    media_type VARCHAR(8) NOT NULL,
    media_url VARCHAR(1024) NOT NULL,
    thumbnail_url VARCHAR(1024) NULL,
    duration INT UNSIGNED NOT NULL DEFAULT 5,
    created_at DATETIME(6) NOT NULL,
    expires_at DATETIME(6) NULL,
    KEY idx_stories_agent_created (agent_id, created_at),
    KEY idx_stories_expires (expires_at),
    CONSTRAINT fk_stories_agent FOREIGN KEY (agent_id) REFERENCES agents (id) ON DELETE CASCADE
)";

const PASSWORD_RESET_TOKENS: &str = "CREATE TABLE IF NOT EXISTS password_reset_tokens (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    user_id BIGINT NOT NULL,
    token_hash CHAR(64) NOT NULL,
    expires_at DATETIME(6) NOT NULL,
    used BOOLEAN NOT NULL DEFAULT FALSE,
    created_at DATETIME(6) NOT NULL,
    UNIQUE KEY uq_reset_token_hash (token_hash),
    KEY idx_reset_user (user_id),
    KEY idx_reset_expires (expires_at),
    CONSTRAINT fk_reset_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
)";

/// `(table, CREATE TABLE IF NOT EXISTS ...)` pairs; parents come before children
pub const TABLES: [(&str, &str); 9] = [
    ("users", USERS),
    ("categories", CATEGORIES),
    ("agents", AGENTS),
    ("services", SERVICES),
    ("properties", PROPERTIES),
    ("projects", PROJECTS),
    ("contacts", CONTACTS),
    ("stories", STORIES),
    ("password_reset_tokens", PASSWORD_RESET_TOKENS),
];

/// Full statement for one table definition
pub fn create_statement(ddl: &str) -> String {
    format!("{} {}", ddl, TABLE_OPTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_follow_parents() {
        let position = |name: &str| TABLES.iter().position(|(t, _)| *t == name).unwrap();
        for (table, ddl) in TABLES {
            for parent in ["users", "agents", "categories", "properties"] {
                if ddl.contains(&format!("REFERENCES {} ", parent)) {
                    assert!(position(parent) < position(table), "{} before {}", parent, table);
                }
            }
        }
    }

    #[test]
    fn test_statements_are_idempotent() {
        for (_, ddl) in TABLES {
            assert!(create_statement(ddl).starts_with("CREATE TABLE IF NOT EXISTS"));
        }
    }
}
