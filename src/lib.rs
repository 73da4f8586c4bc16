//! Core library for the surplus operations service: the donation hub
//! directory (search, filtering, CSV import) and the kitchen inventory
//! tracker (stock status classification, CRUD, transactions).

pub mod config;
pub mod directory;
pub mod error;
pub mod inventory;
pub mod telemetry;
