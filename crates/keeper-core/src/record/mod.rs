//! Record list state: model and pure reducer.

pub mod model;
pub mod reducer;

pub use model::{Record, RecordList};
pub use reducer::{RecordAction, reduce};
