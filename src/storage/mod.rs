pub mod sqlite;

pub use sqlite::{AlertError, AlertStore, SettingsStore};
