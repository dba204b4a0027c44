pub mod client;
pub mod models;
pub mod repositories;

pub use client::MongoRecordStore;
