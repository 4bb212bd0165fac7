//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories for database-less runs and tests
//! - **security**: argon2id password hashing shared by both repository sets
//! - **storage**: local-filesystem photo store
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no request-handling logic.

pub mod memory;
pub mod persistence;
pub mod security;
pub mod storage;
