pub mod assets_client;
pub mod auth_store;
pub mod challenge_client;
pub mod command_file_bridge;
pub mod completion_monitor;
pub mod config_service;
pub mod emuhawk;
pub mod google_auth;
pub mod paths;
pub mod result_client;
pub mod settings_store;
pub mod storage;
pub mod twitch;

pub use crate::assets_client::AssetsClient;
pub use crate::auth_store::AuthStore;
pub use crate::challenge_client::HttpCatalogSource;
pub use crate::command_file_bridge::CommandFileBridge;
pub use crate::completion_monitor::CompletionMonitor;
pub use crate::config_service::ConfigService;
pub use crate::emuhawk::EmuHawkProcess;
pub use crate::google_auth::GoogleTokenRefresher;
pub use crate::paths::RcPaths;
pub use crate::result_client::HttpResultSubmitter;
pub use crate::settings_store::SettingsStore;
pub use crate::storage::FileKeyValueStore;
pub use crate::twitch::TwitchIrcRelay;
