//! `stockview-client`
//!
//! **Responsibility:** the inventory view controller and its collaborators.
//!
//! This crate provides:
//! - The remote inventory service seam (`InventoryApi`) and its HTTP client
//! - The local item store and per-item mutation sequencing
//! - `InventoryController`, which owns all view state (collection, search
//!   term, staged edit, last error) and derives the table, chart and report
//! - Report export through a pluggable PDF engine (`lopdf` by default)
//!
//! The client is a **thin shell** around the inventory service: the service
//! remains the authority and local state only changes after it answers.

pub mod api;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod pdf;
pub mod store;

pub use api::{ApiError, HttpInventoryApi, InventoryApi};
pub use config::{ClientConfig, ConfigError};
pub use controller::{ConfirmPrompt, DeleteOutcome, InventoryController};
pub use coordinator::{MutationCoordinator, MutationState};
pub use error::{ControllerError, ErrorKind};
pub use export::{ExportError, PageSize, PdfEngine, TextAlign, export_report};
pub use pdf::LopdfEngine;
pub use store::ItemStore;
