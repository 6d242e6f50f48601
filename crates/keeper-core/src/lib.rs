//! Core state container for Keeper.
//!
//! This crate is the single source of truth for business invariants: the
//! `{session, records}` state tree, the pure reducers that evolve it, the
//! store that dispatches actions and publishes change notifications, and the
//! `DurableStore` trait the persistence layer implements. No I/O happens
//! here.

pub mod action;
pub mod error;
pub mod idgen;
pub mod record;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;

pub use action::Action;
pub use error::{KeeperError, Result};
pub use idgen::{IdGenerator, SequenceGenerator, UuidGenerator};
pub use record::{Record, RecordList};
pub use session::{Profile, Session};
pub use state::AppState;
pub use storage::{DurableStore, SESSION_KEY};
pub use store::{SessionEffect, Store, Subscription};
