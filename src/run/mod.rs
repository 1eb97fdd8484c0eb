pub mod ledger;
pub mod model;
pub mod report;
pub mod service;
