use std::path::Path;

use anyhow::Context;
use fit_config::FitConfig;
use fit_db::logo_jobs::logo_channel;
use fit_db::service::FitService;
use fit_flags::FlagCache;
use fit_logo::{LogoClient, LogoWorker, WorkerStats};
use tokio::task::JoinHandle;

use crate::cli::GlobalFlags;

/// Flag gating the background logo lookup.
pub const LOGO_FETCH_FLAG: &str = "logo_fetch";

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: FitService,
    pub flags: FlagCache<FitService>,
    pub config: FitConfig,
    logo_worker: Option<JoinHandle<WorkerStats>>,
}

impl AppContext {
    /// Open the database, build the flag cache and preload flags.
    pub async fn init(config: FitConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let service = open_service(&config, flags.db.as_deref())
            .await?
            .with_retention(config.versions.retention);

        let flag_cache = FlagCache::new(
            service.detached_handle(),
            service.clock(),
            config.flags.cache_ttl(),
        )
        .with_preload(config.flags.preload.iter().cloned());
        flag_cache.initialize().await;

        Ok(Self {
            service,
            flags: flag_cache,
            config,
            logo_worker: None,
        })
    }

    /// Start the logo worker if the flag is on and an endpoint is configured.
    ///
    /// Returns whether a worker is running.
    pub async fn start_logo_worker(&mut self) -> anyhow::Result<bool> {
        if self.logo_worker.is_some() {
            return Ok(true);
        }
        if !self.config.logo.is_configured() {
            tracing::debug!("logo endpoint not configured; skipping logo lookups");
            return Ok(false);
        }
        if !self.flags.is_enabled(LOGO_FETCH_FLAG).await {
            tracing::debug!("logo_fetch flag is off; skipping logo lookups");
            return Ok(false);
        }

        let client = LogoClient::from_config(&self.config.logo)
            .context("failed to build logo client")?;
        let (dispatcher, jobs) = logo_channel();
        let worker = LogoWorker::new(client, self.service.detached_handle(), &self.config.logo);
        self.service.attach_logo_dispatcher(dispatcher);
        self.logo_worker = Some(worker.spawn(jobs));
        Ok(true)
    }

    /// Close the logo queue and wait for queued lookups to finish.
    pub async fn shutdown(&mut self) {
        drop(self.service.detach_logo_dispatcher());
        if let Some(handle) = self.logo_worker.take() {
            match handle.await {
                Ok(stats) => tracing::debug!(?stats, "logo worker drained"),
                Err(error) => tracing::warn!(%error, "logo worker task failed"),
            }
        }
    }
}

async fn open_service(config: &FitConfig, db_override: Option<&str>) -> anyhow::Result<FitService> {
    if db_override.is_none() && config.database.is_remote() {
        return FitService::new_remote(&config.database.url, &config.database.auth_token)
            .await
            .context("failed to open remote database");
    }

    let path = db_override.unwrap_or(&config.database.path);
    if path != ":memory:" {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
    }
    FitService::new_local(path)
        .await
        .with_context(|| format!("failed to open database at {path}"))
}
