//! Interactive atlas of wartime camps: static dataset loading, the date-driven
//! snapshot builder, and the HTTP/CLI surfaces that expose it.

pub mod cli;
pub mod config;
pub mod data;
pub mod palette;
pub mod projection;
pub mod server;
pub mod snapshot;
