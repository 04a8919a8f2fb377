//! Configuration module
//!
//! Environment-driven configuration for the server: HTTP, database, auth,
//! upload storage, external tools (ffmpeg/ffprobe) and the TMDB client.

use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const UPLOAD_FOLDER: &str = "uploads";
const USER_MEDIA_LIMIT: i64 = 100;
const MAX_CHUNK_SIZE_MB: usize = 100;
const STREAM_CHUNK_SIZE_BYTES: usize = 1024 * 1024;
const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const TMDB_LANGUAGE: &str = "da-DK";
const TMDB_TIMEOUT_SECS: u64 = 5;

/// Base configuration shared by every service
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
}

/// TMDB (The Movie Database) client settings
#[derive(Clone, Debug)]
pub struct TmdbConfig {
    /// Without a key every lookup yields "no metadata"
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

/// Media library configuration
#[derive(Clone, Debug)]
pub struct VidvaultConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Upload storage
    pub upload_folder: PathBuf,
    pub user_media_limit: i64,
    pub max_chunk_size_bytes: usize,
    pub stream_chunk_size_bytes: usize,
    // External tools
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub tmdb: TmdbConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<VidvaultConfig>);

impl Config {
    fn as_inner(&self) -> &VidvaultConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.as_inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = VidvaultConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_inner().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_inner().base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_inner().base.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.as_inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_inner().base.db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_inner().base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_inner().base.jwt_expiry_hours
    }

    pub fn upload_folder(&self) -> &PathBuf {
        &self.as_inner().upload_folder
    }

    pub fn user_media_limit(&self) -> i64 {
        self.as_inner().user_media_limit
    }

    pub fn max_chunk_size_bytes(&self) -> usize {
        self.as_inner().max_chunk_size_bytes
    }

    pub fn stream_chunk_size_bytes(&self) -> usize {
        self.as_inner().stream_chunk_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_inner().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_inner().ffprobe_path
    }

    pub fn tmdb(&self) -> &TmdbConfig {
        &self.as_inner().tmdb
    }
}

fn is_production_environment(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl VidvaultConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_environment(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            environment,
        };

        let max_chunk_size_mb = env::var("MAX_CHUNK_SIZE_MB")
            .unwrap_or_else(|_| MAX_CHUNK_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_CHUNK_SIZE_MB);

        let tmdb = TmdbConfig {
            api_key: env::var("TMDB_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            base_url: env::var("TMDB_BASE_URL").unwrap_or_else(|_| TMDB_BASE_URL.to_string()),
            image_base_url: env::var("TMDB_IMAGE_BASE_URL")
                .unwrap_or_else(|_| TMDB_IMAGE_BASE_URL.to_string()),
            language: env::var("TMDB_LANGUAGE").unwrap_or_else(|_| TMDB_LANGUAGE.to_string()),
            timeout_secs: env::var("TMDB_TIMEOUT_SECS")
                .unwrap_or_else(|_| TMDB_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(TMDB_TIMEOUT_SECS),
        };

        Ok(VidvaultConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            upload_folder: PathBuf::from(
                env::var("UPLOAD_FOLDER").unwrap_or_else(|_| UPLOAD_FOLDER.to_string()),
            ),
            user_media_limit: env::var("USER_MEDIA_LIMIT")
                .unwrap_or_else(|_| USER_MEDIA_LIMIT.to_string())
                .parse()
                .unwrap_or(USER_MEDIA_LIMIT),
            max_chunk_size_bytes: max_chunk_size_mb * 1024 * 1024,
            stream_chunk_size_bytes: env::var("STREAM_CHUNK_SIZE_BYTES")
                .unwrap_or_else(|_| STREAM_CHUNK_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(STREAM_CHUNK_SIZE_BYTES),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            tmdb,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.user_media_limit <= 0 {
            return Err(anyhow::anyhow!("USER_MEDIA_LIMIT must be greater than 0"));
        }

        if self.stream_chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "STREAM_CHUNK_SIZE_BYTES must be greater than 0"
            ));
        }

        if self.max_chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_CHUNK_SIZE_MB must be greater than 0"));
        }

        if self.tmdb.timeout_secs == 0 {
            return Err(anyhow::anyhow!("TMDB_TIMEOUT_SECS must be greater than 0"));
        }

        Ok(())
    }
}
