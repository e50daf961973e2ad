mod backend_url;
mod client;
pub mod domain;

pub use backend_url::*;
pub use client::*;
