//! Request and response bodies for each resource, with their wire names.

pub mod containers;
pub mod dispensers;
pub mod recommendations;
pub mod sensors;
pub mod session;
