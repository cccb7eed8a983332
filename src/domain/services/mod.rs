//! # Domain Services
//!
//! Domain services encapsulate business rules that don't belong to a
//! single entity. They are pure: no I/O, no clocks, no globals, which
//! keeps the authorization policy and presence math trivially testable.
//!
//! ## Services
//!
//! - **visibility**: view/admin capability decisions over membership state
//! - **presence**: online/offline partitioning of a permitted-user set

pub mod presence;
pub mod visibility;
