//! Validating service layer over the selected backend

mod service;

pub use service::{PackageService, PackageServiceBuilder};
