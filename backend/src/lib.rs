//! Recipe API backend library.
//!
//! Per-user recipes, tags and ingredients behind a session cookie. The
//! crate follows a hexagonal layout: `domain` owns entities, validation and
//! ports; `inbound::http` adapts actix-web requests onto the driving ports;
//! `outbound` provides PostgreSQL, in-memory and filesystem adapters for the
//! driven ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
