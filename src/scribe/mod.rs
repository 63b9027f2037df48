// SPDX-License-Identifier: MIT

pub mod config;
pub mod nodes;
pub mod pipeline;
pub mod prompt;
pub mod state;
