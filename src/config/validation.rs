//! Configuration validation: the one fatal precondition this server has.

use super::Config;

/// `DATABASE_URL` is the sole required setting (§7's fatality rule: "missing
/// required environment variables are fatal at process start"). Everything
/// else has a compiled default.
pub fn validate_required(config: &Config) -> anyhow::Result<()> {
    if config.database_url.trim().is_empty() {
        anyhow::bail!(
            "DATABASE_URL is required but was not set (via environment, config file, or \
             PARLOUR__DATABASE_URL)"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_database_url() {
        let config = Config::default();
        assert!(validate_required(&config).is_err());
    }

    #[test]
    fn accepts_nonempty_database_url() {
        let config = Config { database_url: "postgres://localhost/parlour".to_string(), ..Config::default() };
        assert!(validate_required(&config).is_ok());
    }
}
