use anyhow::Context;

/// Longest approval link lifetime accepted from the environment.
pub const MAX_APPROVAL_TTL_DAYS: i64 = 365;
const DEFAULT_APPROVAL_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Origin the emailed approve/reject links point at.
    pub public_base_url: String,
    /// Key for the `/api/approval/request` and `/api/approval/pending` routes.
    /// Admin routes answer 500 while it is unset.
    pub admin_key: Option<String>,
    pub gmail_user: Option<String>,
    pub gmail_app_password: Option<String>,
    pub smtp_host: String,
    pub mail_from_name: String,
    /// Lifetime of an approval link. Set via APPROVAL_TOKEN_TTL_DAYS, 1..=365. Default: 7.
    pub approval_ttl_days: i64,
    pub banner_analyzer_cmd: String,
    pub banner_timeout_secs: u64,
    pub cors_origin: Option<String>,
}

impl Config {
    /// Both halves of the SMTP login, if configured.
    pub fn mail_credentials(&self) -> Option<(&str, &str)> {
        match (self.gmail_user.as_deref(), self.gmail_app_password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }

    pub fn approval_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.approval_ttl_days)
            .unwrap_or_else(|| chrono::Duration::days(DEFAULT_APPROVAL_TTL_DAYS))
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a `Config` from an arbitrary variable source.
pub fn from_lookup<F>(var: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

    let gmail_user = non_empty("GMAIL_USER");
    let gmail_app_password = non_empty("GMAIL_APP_PASSWORD");

    if gmail_user.is_none() || gmail_app_password.is_none() {
        let env_mode = var("EVENT_CORNER_ENV")
            .or_else(|| var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "GMAIL_USER and GMAIL_APP_PASSWORD must be set in production; \
                 approval emails cannot be sent without them."
            );
        }
        tracing::warn!("GMAIL_USER or GMAIL_APP_PASSWORD is not set; approval emails will fail");
    }

    let approval_ttl_days = match var("APPROVAL_TOKEN_TTL_DAYS") {
        None => DEFAULT_APPROVAL_TTL_DAYS,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(days) if (1..=MAX_APPROVAL_TTL_DAYS).contains(&days) => days,
            _ => {
                tracing::warn!(
                    value = %raw,
                    "APPROVAL_TOKEN_TTL_DAYS must be between 1 and {}; using {}",
                    MAX_APPROVAL_TTL_DAYS,
                    DEFAULT_APPROVAL_TTL_DAYS
                );
                DEFAULT_APPROVAL_TTL_DAYS
            }
        },
    };

    let public_base_url =
        non_empty("PUBLIC_BASE_URL").unwrap_or_else(|| "http://localhost:5000".into());
    let parsed = url::Url::parse(&public_base_url)
        .with_context(|| format!("PUBLIC_BASE_URL '{}' is not a valid URL", public_base_url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("PUBLIC_BASE_URL must be an http(s) URL, got '{}'", public_base_url);
    }

    Ok(Config {
        port: var("PORT").and_then(|v| v.parse().ok()).unwrap_or(5000),
        database_url: var("DATABASE_URL")
            .unwrap_or_else(|| "postgres://localhost/event_corner".into()),
        public_base_url,
        admin_key: non_empty("ADMIN_KEY"),
        gmail_user,
        gmail_app_password,
        smtp_host: non_empty("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".into()),
        mail_from_name: non_empty("MAIL_FROM_NAME").unwrap_or_else(|| "Event Corner".into()),
        approval_ttl_days,
        banner_analyzer_cmd: non_empty("BANNER_ANALYZER_CMD")
            .unwrap_or_else(|| "python3 ai/banner_analyzer.py".into()),
        banner_timeout_secs: var("BANNER_ANALYZER_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(120),
        cors_origin: non_empty("CORS_ORIGIN"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.public_base_url, "http://localhost:5000");
        assert_eq!(cfg.smtp_host, "smtp.gmail.com");
        assert_eq!(cfg.mail_from_name, "Event Corner");
        assert_eq!(cfg.approval_ttl_days, 7);
        assert_eq!(cfg.banner_timeout_secs, 120);
        assert!(cfg.admin_key.is_none());
        assert!(cfg.mail_credentials().is_none());
    }

    #[test]
    fn test_overrides() {
        let cfg = from_lookup(lookup(&[
            ("PORT", "8080"),
            ("ADMIN_KEY", "s3cret"),
            ("GMAIL_USER", "noreply@ec.test"),
            ("GMAIL_APP_PASSWORD", "app-pass"),
            ("APPROVAL_TOKEN_TTL_DAYS", "3"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.admin_key.as_deref(), Some("s3cret"));
        assert_eq!(cfg.mail_credentials(), Some(("noreply@ec.test", "app-pass")));
        assert_eq!(cfg.approval_ttl(), chrono::Duration::days(3));
    }

    #[test]
    fn test_public_base_url_must_be_http() {
        assert!(from_lookup(lookup(&[("PUBLIC_BASE_URL", "not a url")])).is_err());
        assert!(from_lookup(lookup(&[("PUBLIC_BASE_URL", "ftp://ec.test")])).is_err());
        let cfg = from_lookup(lookup(&[("PUBLIC_BASE_URL", "https://ec.test")])).unwrap();
        assert_eq!(cfg.public_base_url, "https://ec.test");
    }

    #[test]
    fn test_invalid_ttl_falls_back() {
        for raw in ["0", "-3", "soon"] {
            let cfg = from_lookup(lookup(&[("APPROVAL_TOKEN_TTL_DAYS", raw)])).unwrap();
            assert_eq!(cfg.approval_ttl_days, 7, "{raw}");
        }
    }

    #[test]
    fn test_oversized_ttl_falls_back() {
        for raw in ["366", "1000000000", "200000000000000"] {
            let cfg = from_lookup(lookup(&[("APPROVAL_TOKEN_TTL_DAYS", raw)])).unwrap();
            assert_eq!(cfg.approval_ttl_days, 7, "{raw}");
            assert_eq!(cfg.approval_ttl(), chrono::Duration::days(7));
        }

        let cfg = from_lookup(lookup(&[("APPROVAL_TOKEN_TTL_DAYS", "365")])).unwrap();
        assert_eq!(cfg.approval_ttl(), chrono::Duration::days(MAX_APPROVAL_TTL_DAYS));
    }

    #[test]
    fn test_ttl_conversion_never_panics() {
        let cfg = Config {
            approval_ttl_days: i64::MAX,
            ..from_lookup(lookup(&[])).unwrap()
        };
        assert_eq!(cfg.approval_ttl(), chrono::Duration::days(7));
    }

    #[test]
    fn test_production_requires_mail_credentials() {
        let err = from_lookup(lookup(&[("EVENT_CORNER_ENV", "production")])).unwrap_err();
        assert!(err.to_string().contains("GMAIL_USER"));

        assert!(from_lookup(lookup(&[
            ("EVENT_CORNER_ENV", "production"),
            ("GMAIL_USER", "noreply@ec.test"),
            ("GMAIL_APP_PASSWORD", "app-pass"),
        ]))
        .is_ok());
    }
}
