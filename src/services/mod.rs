//! Business logic over the record store. Handlers stay thin; rules about
//! validation, denormalization and referential integrity live here.

pub mod accounts;
pub mod dashboard;
pub mod demands;
