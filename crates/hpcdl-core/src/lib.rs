pub mod config;
pub mod logging;

pub mod driver;
pub mod job;
pub mod links;
pub mod reconcile;
pub mod retry;
pub mod runner;
pub mod state;
pub mod status;
pub mod transfer;
pub mod url_model;
pub mod verify;
