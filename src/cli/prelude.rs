// SPDX-FileCopyrightText: (C) 2024 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

#![allow(unused_imports)]

pub(crate) use anyhow::{Context, Result};
pub(crate) use clap::{Parser, Subcommand};
pub(crate) use tracing::{debug, info, warn};

pub(crate) use crate::client::{Backend, Client};
pub(crate) use crate::render::Style;
