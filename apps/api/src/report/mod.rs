//! Quote reports. A report is an `interactions` row of kind `report`; one per
//! user per quote.

pub mod handlers;
pub mod service;
pub mod validation;
