// SPDX-License-Identifier: MIT

//! scribe-rs - plan, write and save a document with a language model
//!
//! - [adk] - model clients and error types
//! - [scribe] - the planning → writing → saving pipeline

pub mod adk;
pub mod scribe;
