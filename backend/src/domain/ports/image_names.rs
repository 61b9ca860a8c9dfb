//! Source of random identifiers for stored image names.

use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
pub trait ImageNameGenerator: Send + Sync {
    /// A fresh, unguessable file stem.
    fn next_name(&self) -> String;
}

/// UUID v4 names.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidImageNames;

impl ImageNameGenerator for UuidImageNames {
    fn next_name(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
