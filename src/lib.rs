// Pedantic: suppress noise for internal crate code.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod notify;
pub mod pagination;
pub mod repository;
pub mod service;
pub mod session;
pub mod transport;
pub mod types;

pub use error::{ClientError, Result};
