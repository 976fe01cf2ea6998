//! Host information and logging helpers.

pub mod helpers;
