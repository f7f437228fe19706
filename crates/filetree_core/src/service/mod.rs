//! Core use-case services.
//!
//! # Responsibility
//! - Turn drop and label-edit gestures into store writes.
//! - Keep tree views decoupled from storage details.

pub mod folder_service;
