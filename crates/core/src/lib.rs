pub mod api;
pub mod callback;
pub mod error;
pub mod ports;
pub mod session;
pub mod storage;
pub mod types;
pub mod view;

pub use error::{CallbackError, CallbackResult};
pub use types::*;
