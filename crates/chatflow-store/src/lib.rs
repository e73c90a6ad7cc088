//! Chatflow Store
//!
//! This crate provides the storage layer for flows:
//! - The [`StorageBackend`] trait with in-memory and filesystem media
//! - [`Storage`] and [`StorageContext`]: a medium plus a change bus, so that
//!   several independent views (one per open editor) see each other's writes
//! - [`KeyedStore`]: a typed value bound to one key, stored as JSON
//!
//! Storage failures are contained here. Callers of `KeyedStore` never see an
//! error; they get the fallback on read and keep their in-memory value on
//! write.

mod backend;
mod context;
mod error;
mod fs;
mod keyed;
mod memory;

pub use backend::StorageBackend;
pub use context::{Storage, StorageContext, StorageEvent};
pub use error::StoreError;
pub use fs::FileStorage;
pub use keyed::KeyedStore;
pub use memory::MemoryStorage;
