//! Route modules for the store service
//!
//! - transactions: CRUD over the transaction collection

pub mod transactions;
