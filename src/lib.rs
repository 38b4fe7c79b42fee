//! Entitlement and Payroll Reconciliation Engine
//!
//! This crate reconciles employee entitlements against an external document
//! store: the monthly meal subsidy from attendance, weekday overtime from the
//! duty roster, annual leave balances and their year-end cash-out, and the
//! monthly payroll record that gathers them.
//!
//! Pure arithmetic lives in [`calculation`]; store-backed operations live in
//! [`services`]; [`api`] exposes both over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod schema;
pub mod services;
pub mod store;
