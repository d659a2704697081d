use crate::error::AppError;
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LIMIT: i64 = 200_000;
pub const DEFAULT_API_URL: &str = "http://localhost:8000/top_songs";

/// 数据库连接参数，导出工具与服务共用。
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: lookup("DB_HOST").unwrap_or_else(|| "172.16.10.11".to_string()),
            name: lookup("DB_NAME").unwrap_or_else(|| "n8n".to_string()),
            user: lookup("DB_USER").unwrap_or_else(|| "postgres".to_string()),
            password: lookup("DB_PASS").unwrap_or_else(|| "password".to_string()),
            port: parse_or(&lookup, "DB_PORT", 5432)?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("port", &self.port)
            .finish()
    }
}

/// 同步工具的全部配置。
///
/// 必填项缺失时在任何网络操作之前返回 `AppError::Config`。
#[derive(Clone)]
pub struct SyncConfig {
    pub ssh_host: String,
    pub ssh_port: u16,
    pub ssh_user: String,
    pub ssh_pass: String,
    pub source_dir: String,
    pub target_dir: String,
    pub api_url: String,
    pub limit: i64,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| match lookup(key).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let ssh_host = required("SSH_HOST");
        let ssh_user = required("SSH_USER");
        let ssh_pass = required("SSH_PASS");
        let source_dir = required("NAS_SOURCE_DIR");
        let target_dir = required("NAS_TARGET_DIR");

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "Missing SSH or NAS configuration: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            ssh_host,
            ssh_port: parse_or(&lookup, "SSH_PORT", 22)?,
            ssh_user,
            ssh_pass,
            source_dir,
            target_dir,
            api_url: lookup("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            limit: limit_from_lookup(&lookup)?,
        })
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("ssh_host", &self.ssh_host)
            .field("ssh_port", &self.ssh_port)
            .field("ssh_user", &self.ssh_user)
            .field("ssh_pass", &"***")
            .field("source_dir", &self.source_dir)
            .field("target_dir", &self.target_dir)
            .field("api_url", &self.api_url)
            .field("limit", &self.limit)
            .finish()
    }
}

/// 结果条数上限，`LIMIT` 优先，兼容旧的小写 `limit`。
pub fn limit_from_lookup<F>(lookup: &F) -> Result<i64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    if lookup("LIMIT").is_some() {
        parse_or(lookup, "LIMIT", DEFAULT_LIMIT)
    } else {
        parse_or(lookup, "limit", DEFAULT_LIMIT)
    }
}

pub fn limit_from_env() -> Result<i64, AppError> {
    limit_from_lookup(&|key: &str| std::env::var(key).ok())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid value for {}: '{}' ({})", key, raw, e))),
        _ => Ok(default),
    }
}
