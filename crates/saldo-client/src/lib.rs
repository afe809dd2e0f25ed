//! Client application for the saldo store service
//!
//! - http: the store service calls behind `TransactionApi`
//! - state: records with balances, edit session, filter, notifications
//! - prefs: display preferences behind a key-value store
//! - app: the controller driving all of the above

pub mod app;
pub mod http;
pub mod prefs;
pub mod state;

pub use app::FinanceApp;
pub use http::{ApiRef, HttpStoreClient, TransactionApi};
pub use prefs::{DisplayPreferences, FilePreferences, MemoryPreferences, PreferenceStore};
pub use state::{ClientState, Notification, NotificationLevel};
