// src/lib.rs

//! cartkeep: per-user shopping carts that stay consistent under concurrency.
//!
//! The crate provides:
//!  - The cart data model with frozen price snapshots ([`model`]).
//!  - Catalog lookup and one-time import contracts ([`catalog`]).
//!  - A cart store contract with versioned, conditional saves ([`store`]).
//!  - The [`CartEngine`], which adds, updates and removes cart lines against
//!    current stock and retries whole operations on version conflicts.
//!  - A small async step runner the engine is built on ([`pipeline`]).
//!
//! In-memory backends for catalog and store are included; database backends
//! implement [`CatalogReader`], [`CatalogImport`] and [`CartStore`].

pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod store;

pub use crate::catalog::{CatalogImport, CatalogReader, InMemoryCatalog};
pub use crate::engine::{CartEngine, EngineConfig};
pub use crate::error::{CartError, CartResult, PipelineError, StoreError};
pub use crate::model::{Cart, CartItem, CartView, NewProduct, Product};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult};
pub use crate::store::{CartStore, InMemoryCartStore};

/*
    Request flow:
    1. The caller has already resolved an authenticated user id.
    2. CartEngine picks the pipeline for the operation and seeds a MutationCtx.
    3. Steps validate input, take a fresh product snapshot, load or create the
       cart and edit a working copy.
    4. persist_cart saves with the version that was read. A StoreConflict
       re-runs the pipeline from step 1; anything else is final.
*/
