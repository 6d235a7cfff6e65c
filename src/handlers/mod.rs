//! HTTP handlers

pub mod feedback;
pub mod health;
pub mod scan;
