/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Bounded capacity of the callback dispatch queue (default: `1024`).
    pub callback_queue_capacity: usize,
    /// Base URL of the generation provider's API.
    pub provider_base_url: String,
    /// API key sent as a bearer token on provider calls.
    pub provider_api_key: String,
    /// S3 bucket receiving relocated media.
    pub media_bucket: String,
    /// Public URL prefix under which relocated media is readable.
    pub media_public_base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                        |
    /// |---------------------------|--------------------------------|
    /// | `HOST`                    | `0.0.0.0`                      |
    /// | `PORT`                    | `3000`                         |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`        |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                           |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                           |
    /// | `CALLBACK_QUEUE_CAPACITY` | `1024`                         |
    /// | `PROVIDER_BASE_URL`       | `https://api.provider.example` |
    /// | `PROVIDER_API_KEY`        | (empty)                        |
    /// | `MEDIA_BUCKET`            | `songforge-media`              |
    /// | `MEDIA_PUBLIC_BASE_URL`   | `http://localhost:9000/media`  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let callback_queue_capacity: usize = std::env::var("CALLBACK_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "1024".into())
            .parse()
            .expect("CALLBACK_QUEUE_CAPACITY must be a valid usize");

        let provider_base_url = std::env::var("PROVIDER_BASE_URL")
            .unwrap_or_else(|_| "https://api.provider.example".into());

        let provider_api_key = std::env::var("PROVIDER_API_KEY").unwrap_or_default();

        let media_bucket =
            std::env::var("MEDIA_BUCKET").unwrap_or_else(|_| "songforge-media".into());

        let media_public_base_url = std::env::var("MEDIA_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:9000/media".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            callback_queue_capacity,
            provider_base_url,
            provider_api_key,
            media_bucket,
            media_public_base_url,
        }
    }
}
