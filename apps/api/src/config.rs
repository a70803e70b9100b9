use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub auth_base_url: String,
    pub generation_base_url: String,
    pub platform_api_key: String,
    pub admin_emails: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            auth_base_url: require_env("AUTH_BASE_URL")?,
            generation_base_url: require_env("GENERATION_BASE_URL")?,
            platform_api_key: require_env("PLATFORM_API_KEY")?,
            admin_emails: parse_admin_emails(
                &std::env::var("ADMIN_EMAILS").unwrap_or_default(),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Comma-separated allow-list of administrator emails. Entries are trimmed,
/// lowercased and deduplicated; an unset or empty variable yields no entries.
fn parse_admin_emails(raw: &str) -> Vec<String> {
    let mut emails: Vec<String> = raw
        .split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    emails.sort();
    emails.dedup();
    emails
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_emails_with_whitespace_and_case() {
        let emails = parse_admin_emails(" Boss@Example.com , ops@example.com,");
        assert_eq!(emails, vec!["boss@example.com", "ops@example.com"]);
    }

    #[test]
    fn empty_admin_emails_yields_no_entries() {
        assert!(parse_admin_emails("").is_empty());
        assert!(parse_admin_emails(" , ,").is_empty());
    }

    #[test]
    fn duplicate_admin_emails_collapse() {
        let emails = parse_admin_emails("a@x.com,A@X.COM,a@x.com");
        assert_eq!(emails, vec!["a@x.com"]);
    }
}
