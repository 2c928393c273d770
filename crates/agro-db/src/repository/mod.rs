//! # Repository Module
//!
//! Storage access for the ledger.
//!
//! ## Two Faces per Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Free functions taking `&mut SqliteConnection`                          │
//! │  ├── used by the ledger inside ONE transaction                          │
//! │  └── never begin, commit or roll back                                   │
//! │                                                                         │
//! │      lot::decrement(&mut tx, lot_id, qty)                               │
//! │      movement::append(&mut tx, &new_movement)                           │
//! │                                                                         │
//! │  `XRepository { pool }`                                                 │
//! │  ├── read-only, acquires a pooled connection per call                  │
//! │  └── reporting and tests                                                │
//! │                                                                         │
//! │      db.lots().available("UREA-25", "SUC-01")                           │
//! │      db.movements().query(&filter, page)                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`lot`] - Lot store: quantities per (product, branch, lot code)
//! - [`movement`] - Append-only movement log
//! - [`transfer`] - Append-only transfer audits
//! - [`sale`] - Sale headers and items

pub mod lot;
pub mod movement;
pub mod sale;
pub mod transfer;
