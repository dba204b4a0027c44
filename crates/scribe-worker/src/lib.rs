pub mod config;
pub mod reply;
pub mod worker;

pub use reply::format_summary;
pub use worker::Worker;
