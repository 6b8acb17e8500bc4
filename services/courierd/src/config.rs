use std::env;
use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    pub http_port: u16,
    pub ws_port: u16,
    pub db_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            http_port: env_u16("PORT", 4000),
            ws_port: env_u16("WS_PORT", 4001),
            db_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/courier.db".to_string())
                .into(),
        }
    }
}

fn env_u16(key: &str, default: u16) -> u16 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
