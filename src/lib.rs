// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

// Clippy suppressions. These are the global ones I don't care about.
#![allow(clippy::needless_return)]
#![allow(clippy::redundant_field_names)]

pub mod logger;

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod pages;
pub mod prelude;
pub mod query;
pub mod render;
pub mod timerange;
pub mod types;
pub mod version;
pub mod widget;

#[cfg(test)]
mod testing;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate anyhow;

#[macro_use]
extern crate serde_json;
