//! Environment-driven settings shared by the server and the CLI.

use std::net::SocketAddr;

pub const DEFAULT_SQLITE_PATH: &str = "planner_items.sqlite";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LOG_FILTER: &str = "planner=info,info";

pub const SQLITE_PATH_ENV: &str = "PLANNER_SQLITE_PATH";
pub const ADDR_ENV: &str = "PLANNER_ADDR";
pub const LOG_ENV: &str = "PLANNER_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub sqlite_path: String,
}

impl ServerConfig {
    /// Explicit values win over the environment, which wins over defaults.
    pub fn resolve(addr: Option<&str>, sqlite_path: Option<&str>) -> Result<Self, String> {
        let raw_addr = non_blank(addr.map(str::to_string))
            .or_else(|| env_value(ADDR_ENV))
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|_| format!("invalid addr: {raw_addr}"))?;

        let sqlite_path = non_blank(sqlite_path.map(str::to_string))
            .unwrap_or_else(default_sqlite_path);

        Ok(Self { addr, sqlite_path })
    }
}

pub fn default_sqlite_path() -> String {
    env_value(SQLITE_PATH_ENV).unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string())
}

pub fn env_value(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
