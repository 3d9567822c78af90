//! Repository modules for database access.

pub mod customer;
pub mod order;
pub mod product;
