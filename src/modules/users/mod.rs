//! User identities and the role store.
//!
//! - [`store`]: the [`RoleStore`](store::RoleStore) port
//! - [`postgres`] / [`memory`]: its adapters
//! - [`service`], [`controller`], [`router`]: `/me` and admin user endpoints

pub mod controller;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod router;
pub mod service;
pub mod store;
