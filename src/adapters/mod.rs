#[cfg(feature = "sqlite")]
pub mod csv_loader;
pub mod file_config_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
