//! Session state: model and pure reducer.

pub mod model;
pub mod reducer;

pub use model::{Profile, Session};
pub use reducer::{SessionAction, reduce};
