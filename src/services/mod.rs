//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on request decoding and status mapping. Pure
//! rules (confirmation threshold, bill splitting, distance, status
//! transitions) live beside the queries that feed them and are tested
//! without a database.

pub mod party;
pub mod places;
pub mod settlement;
pub mod shopping;
pub mod store;
pub mod user;

#[cfg(all(test, feature = "live-db-tests"))]
pub(crate) mod test_db;
