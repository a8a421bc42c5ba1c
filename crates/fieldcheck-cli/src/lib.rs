//! Library interface for the fieldcheck CLI

pub mod document;
pub mod settings;
pub mod validate;
