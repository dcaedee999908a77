pub mod interaction;
pub mod quote;
pub mod user;
