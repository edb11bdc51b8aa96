use std::env;
use anyhow::{Context, Result};

const DEFAULT_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    /// Sent as `apikey`; the service role key is used when unset.
    pub supabase_anon_key: Option<String>,
    /// HS256 secret used to verify access tokens. Without it tokens are only decoded.
    pub supabase_jwt_secret: Option<String>,
    pub allowed_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let supabase_url = non_empty("SUPABASE_URL").context("SUPABASE_URL not set")?;
        let supabase_service_role_key =
            non_empty("SUPABASE_SERVICE_ROLE_KEY").context("SUPABASE_SERVICE_ROLE_KEY not set")?;

        let port = match non_empty("PORT") {
            Some(p) => p.parse::<u16>().with_context(|| format!("PORT is not a valid port: {}", p))?,
            None => DEFAULT_PORT,
        };

        let origins = non_empty("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string());

        Ok(Self {
            supabase_url,
            supabase_service_role_key,
            supabase_anon_key: non_empty("SUPABASE_ANON_KEY"),
            supabase_jwt_secret: non_empty("SUPABASE_JWT_SECRET"),
            allowed_origins: parse_origins(&origins),
            port,
        })
    }

    /// PostgREST root, e.g. `https://xyz.supabase.co/rest/v1`
    pub fn rest_base_url(&self) -> String {
        let base = self.supabase_url.trim_end_matches('/');
        if base.ends_with("/rest/v1") {
            base.to_string()
        } else {
            format!("{}/rest/v1", base)
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn mask_key(k: &str) -> String {
    let chars: Vec<char> = k.chars().collect();
    if chars.len() <= 8 {
        return "[REDACTED]".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}
