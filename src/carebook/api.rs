//! # API Facade
//!
//! A thin layer over [`crate::commands`]. Every UI (the CLI today) goes through
//! [`CarebookApi`]; it dispatches to a command, passes along the loaded
//! configuration and returns `Result<CmdResult>`.
//!
//! The facade does no printing and holds no business logic. It is generic over
//! [`RecordStore`] so the same calls run against a `FileStore` in production
//! and an `InMemoryStore` in tests.

use crate::commands;
use crate::config::CarebookConfig;
use crate::error::Result;
use crate::model::Collection;
use crate::store::RecordStore;

pub struct CarebookApi<S: RecordStore> {
    store: S,
    config: CarebookConfig,
    paths: commands::CarebookPaths,
}

impl<S: RecordStore> CarebookApi<S> {
    pub fn new(store: S, config: CarebookConfig, paths: commands::CarebookPaths) -> Self {
        Self {
            store,
            config,
            paths,
        }
    }

    pub fn list(
        &self,
        collection: Collection,
        options: &commands::list::ListOptions,
    ) -> Result<commands::CmdResult> {
        commands::list::run(&self.store, &self.config, collection, options)
    }

    pub fn show(&self, collection: Collection, id: &str) -> Result<commands::CmdResult> {
        commands::show::run(&self.store, collection, id)
    }

    pub fn delete(
        &mut self,
        collection: Collection,
        id: &str,
        code: &str,
    ) -> Result<commands::CmdResult> {
        commands::delete::run(&mut self.store, &self.config, collection, id, code)
    }

    pub fn diagnoses(&self) -> Result<commands::CmdResult> {
        commands::diagnoses::run(&self.store)
    }

    pub fn route(&self, category: &str, id: &str) -> commands::CmdResult {
        commands::route::run(category, id)
    }

    /// Runs a config action; a successful `Set` also updates the live config.
    pub fn config(&mut self, action: ConfigAction) -> Result<commands::CmdResult> {
        let result = commands::config::run(&self.paths, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn current_config(&self) -> &CarebookConfig {
        &self.config
    }
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::list::ListOptions;
pub use crate::commands::show::{detail_sections, DetailSection, PLACEHOLDER};
pub use crate::commands::{CarebookPaths, CmdMessage, CmdResult, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;

    fn api(store: InMemoryStore) -> (tempfile::TempDir, CarebookApi<InMemoryStore>) {
        let dir = tempfile::tempdir().unwrap();
        let paths = CarebookPaths {
            data_dir: dir.path().to_path_buf(),
        };
        (dir, CarebookApi::new(store, CarebookConfig::default(), paths))
    }

    #[test]
    fn list_uses_configured_page_size() {
        let (_dir, mut api) = api(StoreFixture::new().with_patients(10).store);
        api.config(ConfigAction::Set("page-size".into(), "4".into()))
            .unwrap();
        assert_eq!(api.current_config().page_size, 4);

        let result = api
            .list(Collection::Patients, &ListOptions::default())
            .unwrap();
        let page = result.page.unwrap();
        assert_eq!(page.items.len(), 4);
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn delete_dispatches_with_live_code() {
        let (_dir, mut api) = api(StoreFixture::new().with_reports(2).store);
        api.config(ConfigAction::Set("confirmation-code".into(), "4321".into()))
            .unwrap();

        let result = api.delete(Collection::Reports, "report-1", "4321").unwrap();
        assert!(!result.has_errors());

        let remaining = api.list(Collection::Reports, &ListOptions::default()).unwrap();
        assert_eq!(remaining.page.unwrap().total, 1);
    }

    #[test]
    fn show_and_route_dispatch() {
        let (_dir, api) = api(StoreFixture::new().with_patients(1).store);
        let shown = api.show(Collection::Patients, "patient-1").unwrap();
        assert_eq!(shown.route.as_deref(), Some("/patient-details/patient-1"));
        assert_eq!(
            api.route("unknown", "x").route.as_deref(),
            Some("/report-details-default/x")
        );
    }

    #[test]
    fn diagnoses_dispatch() {
        let (_dir, api) = api(StoreFixture::new().with_patients(2).store);
        let result = api.diagnoses().unwrap();
        assert!(result.options.is_empty());
    }
}
