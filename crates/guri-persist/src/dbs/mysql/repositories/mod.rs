//! `*Repository` implementations for the MySQL client, one file per resource.

mod agent;
mod catalog;
mod contact;
mod project;
mod property;
mod story;
mod user;

use sqlx::{MySql, QueryBuilder};

/// `%needle%` for a LIKE comparison, with LIKE wildcards in the needle escaped
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Trimmed text, or `None` when blank
pub(crate) fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Inclusive `column BETWEEN min AND max`, each side optional
pub(crate) fn push_range<'args, T>(
    qb: &mut QueryBuilder<'args, MySql>,
    column: &str,
    min: Option<T>,
    max: Option<T>,
) where
    T: 'args + sqlx::Encode<'args, MySql> + sqlx::Type<MySql> + Send,
{
    if let Some(min) = min {
        qb.push(format!(" AND {} >= ", column)).push_bind(min);
    }
    if let Some(max) = max {
        qb.push(format!(" AND {} <= ", column)).push_bind(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Hodan"), "%Hodan%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_active_trims_blank() {
        assert_eq!(active(&Some("  ".to_string())), None);
        assert_eq!(active(&Some(" KM4 ".to_string())), Some("KM4"));
        assert_eq!(active(&None), None);
    }

    #[test]
    fn test_push_range_renders_bounds() {
        let mut qb = QueryBuilder::<MySql>::new("SELECT 1 FROM properties WHERE 1 = 1");
        push_range(&mut qb, "price", Some(100_i64), None);
        push_range(&mut qb, "bedrooms", Some(1_u32), Some(3_u32));
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM properties WHERE 1 = 1 AND price >= ? AND bedrooms >= ? AND bedrooms <= ?"
        );
    }
}
