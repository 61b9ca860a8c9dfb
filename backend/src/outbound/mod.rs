//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: in-process repositories for development and tests
//! - **media**: filesystem image blob store rooted at the media directory
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business logic.

pub mod media;
pub mod memory;
pub mod persistence;
