use std::time::Duration;

use clap::{Parser, ValueEnum};
use database::persistence::storage::StorageEngine;

use crate::lifecycle::ServerOptions;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

/// 👤 Persons REST Server, create / read / update / delete person records over HTTP
#[derive(Parser, Debug)]
#[clap(version)]
pub struct Cli {
    /// Port the server will listen on
    #[clap(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Address the server will listen on
    #[clap(short, long, env = "ADDRESS", default_value = "0.0.0.0")]
    pub address: String,

    /// Postgres connection string, key/value or URL form
    #[clap(
        long,
        env = "POSTGRES_DSN",
        default_value = "host=localhost user=postgres password=postgres dbname=persons"
    )]
    pub postgres_dsn: String,

    /// Where person records are kept. `memory` loses everything on exit
    #[clap(long, env = "STORAGE_ENGINE", value_enum, default_value_t = StorageKind::Postgres)]
    pub storage: StorageKind,

    /// Deployment environment, only reported in the logs
    #[clap(long, env = "APP_ENV", default_value = "test")]
    pub app_env: String,

    /// Log every HTTP request
    #[clap(long)]
    pub log_http: bool,

    #[clap(long, env = "HTTP_WORKERS", default_value_t = 2)]
    pub http_workers: usize,

    /// Seconds to wait for in-flight requests once shutdown starts
    #[clap(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 10)]
    pub shutdown_timeout: u64,
}

impl Cli {
    pub fn storage_engine(&self) -> StorageEngine {
        match self.storage {
            StorageKind::Postgres => StorageEngine::Postgres(self.postgres_dsn.clone()),
            StorageKind::Memory => StorageEngine::Memory,
        }
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            address: self.address.clone(),
            port: self.port,
            http_workers: self.http_workers,
            log_http: self.log_http,
            drain_timeout: Duration::from_secs(self.shutdown_timeout),
        }
    }
}
