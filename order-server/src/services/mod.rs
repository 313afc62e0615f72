//! Long-lived application services

pub mod catalog;

pub use catalog::CatalogService;
