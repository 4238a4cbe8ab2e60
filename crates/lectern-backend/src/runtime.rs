//! Runtime setup and controller wiring.
//!
//! This module builds the async runtime and assembles a controller from the
//! on-disk store and content directory described by [`StoragePaths`].

use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};

use crate::config::StoragePaths;
use crate::content::DirectoryLibrary;
use crate::controller::StateController;
use crate::repository::SettingsRepository;
use crate::store::TomlFileStore;

/// Controller backed by the TOML file store and plain-text content files.
pub type DiskController = StateController<DirectoryLibrary>;

/// Builds the multi-threaded runtime that drives persistence and content
/// loading.
pub fn build_runtime() -> std::io::Result<Runtime> {
    Builder::new_multi_thread()
        .thread_name("lectern-worker")
        .enable_all()
        .build()
}

/// Opens the settings store and creates an unloaded controller on top of it.
/// An unreadable settings file yields the default settings. Must be called
/// from within the runtime.
pub async fn open_controller(paths: &StoragePaths) -> Arc<DiskController> {
    let store = TomlFileStore::open(&paths.settings_file).await;
    let repository = Arc::new(SettingsRepository::new(Arc::new(store)));
    let library = DirectoryLibrary::new(&paths.content_dir);

    Arc::new(StateController::new(repository, library, Handle::current()))
}
