pub mod categories;
pub mod handlers;
pub mod scoring;
pub mod search;
pub mod service;
