//! Background services

pub mod scan;

pub use scan::{spawn_workers, ScanContext, ScanJob};
