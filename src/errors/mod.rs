//! Error types shared across the server

pub mod app_error;
