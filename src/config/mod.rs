use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppMode {
    Frontend,
    Webhook,
}

impl FromStr for AppMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "frontend" => Ok(Self::Frontend),
            "webhook" => Ok(Self::Webhook),
            other => Err(anyhow!("unknown APP_MODE: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub app_mode: AppMode,
    pub aws_region: String,
    pub photo_bucket: String,
    pub table_name: String,
    pub assets_bucket: String,
    pub s3_endpoint: Option<String>,
    pub s3_public_endpoint: Option<String>,
    pub dynamodb_endpoint: Option<String>,
    pub upload_max_bytes: usize,
    pub webhook_url: String,
    pub site_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Only the
    /// variables needed by the selected mode are required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let http_addr = env.or("HTTP_ADDR", "0.0.0.0:80");
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;
        let app_mode: AppMode = env.or("APP_MODE", "frontend").parse()?;

        let frontend = app_mode == AppMode::Frontend;
        let webhook = app_mode == AppMode::Webhook;

        Ok(Self {
            http_addr,
            aws_region: env.or("AWS_REGION", "us-east-1"),
            photo_bucket: env.required_if(frontend, "BUCKET_NAME")?,
            table_name: env.required_if(frontend, "MY_TABLE_NAME")?,
            assets_bucket: env.required_if(frontend, "ASSETS_BUCKET_NAME")?,
            s3_endpoint: env.optional("S3_ENDPOINT"),
            s3_public_endpoint: env.optional("S3_PUBLIC_ENDPOINT"),
            dynamodb_endpoint: env.optional("DYNAMODB_ENDPOINT"),
            upload_max_bytes: env.or_parse("UPLOAD_MAX_BYTES", "10485760")?,
            webhook_url: env.required_if(webhook, "CHIME_URL")?,
            site_url: env.or("SITE_URL", "https://ddos.dog"),
            app_mode,
        })
    }

    pub fn stylesheet_url(&self) -> String {
        format!("https://{}.s3.amazonaws.com/main.css", self.assets_bucket)
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn required_if(&self, required: bool, key: &str) -> Result<String> {
        match self.optional(key) {
            Some(value) => Ok(value),
            None if required => Err(anyhow!("missing required env var: {}", key)),
            None => Ok(String::new()),
        }
    }

    fn or_parse<T>(&self, key: &str, default: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        self.or(key, default)
            .parse::<T>()
            .map_err(|err| anyhow!("invalid {}: {}", key, err))
    }
}
