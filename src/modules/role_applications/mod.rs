//! Role application workflow: users request `trainer` or `seller`, admins
//! approve or reject, approval promotes the user in the role store.

pub mod controller;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod router;
pub mod service;
