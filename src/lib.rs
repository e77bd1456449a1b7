#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, authentication and token"]
#![doc = "revocation machinery, persistence layer, avatar pipeline, routing"]
#![doc = "configuration and error handling for the TaskVault API. The main"]
#![doc = "binary (`main.rs`) uses it to construct and run the application."]

pub mod auth;
pub mod avatar;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
