use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use shopkeep_billing::{BillGenerator, CompanyProfile};
use shopkeep_core::{Clock, DirectorySink, FileSink, SystemClock};
use shopkeep_export::Exporter;
use shopkeep_migration::MigrationJob;
use shopkeep_store::{HttpRemoteStore, JsonFileLocalStore, LocalStore, RemoteStore};

use crate::config::ClientConfig;

/// Capabilities shared by every pipeline. Built once by the caller and
/// passed down; nothing here is global.
#[derive(Clone)]
pub struct AppContext {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    sink: Arc<dyn FileSink>,
    clock: Arc<dyn Clock>,
    profile: CompanyProfile,
}

impl AppContext {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        sink: Arc<dyn FileSink>,
    ) -> Self {
        Self {
            remote,
            local,
            sink,
            clock: Arc::new(SystemClock),
            profile: CompanyProfile::default(),
        }
    }

    /// HTTP remote store, JSON-file local store and a directory sink.
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let http = config
            .http_store()
            .context("remote database is not configured")?;
        info!(
            remote = %http.base_url,
            data_dir = %config.data_dir.display(),
            export_dir = %config.export_dir.display(),
            "client context ready"
        );
        Ok(Self::new(
            Arc::new(HttpRemoteStore::new(http)),
            Arc::new(JsonFileLocalStore::new(&config.data_dir)),
            Arc::new(DirectorySink::new(&config.export_dir)),
        ))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_profile(mut self, profile: CompanyProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    pub fn sink(&self) -> &dyn FileSink {
        self.sink.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    pub fn exporter(&self) -> Exporter {
        Exporter::with_clock(self.sink.clone(), self.clock.clone())
    }

    pub fn migration(&self) -> MigrationJob {
        MigrationJob::new(self.local.clone(), self.remote.clone(), self.sink.clone())
            .with_clock(self.clock.clone())
    }

    pub fn bills(&self) -> BillGenerator {
        BillGenerator::new(self.profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_remote_settings() {
        let cfg = ClientConfig::from_lookup(|_| None).unwrap();
        let err = AppContext::from_config(&cfg).err().unwrap();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn from_config_builds_with_remote_settings() {
        let cfg = ClientConfig::from_lookup(|key| match key {
            "SHOPKEEP_REMOTE_URL" => Some("https://shop.example.co".to_string()),
            "SHOPKEEP_REMOTE_KEY" => Some("anon".to_string()),
            _ => None,
        })
        .unwrap();
        let ctx = AppContext::from_config(&cfg).unwrap();
        assert_eq!(ctx.profile().closing, "Thank you for your business!");
    }
}
