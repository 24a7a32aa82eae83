//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the business rules of the sequence editor and the
//! support chat so route handlers can stay focused on protocol translation.

pub mod catalog;
pub mod editor;
pub mod sequence;
pub mod support;
