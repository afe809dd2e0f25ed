//! Transaction routes - CRUD over the transaction collection
//!
//! Structure:
//! - api.rs: JSON API endpoints

pub mod api;

pub use api::{
    create_transaction,
    delete_all_transactions,
    delete_transaction,
    list_transactions,
    update_transaction,
    MessageResponse,
};
