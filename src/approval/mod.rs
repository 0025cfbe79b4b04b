// SPDX-License-Identifier: MIT

pub mod activity;
pub mod config;
pub mod records;
pub mod workflow;
