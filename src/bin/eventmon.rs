// SPDX-FileCopyrightText: (C) 2020 Jason Ish <jason@codemonkey.net>
// SPDX-License-Identifier: MIT

use clap::Parser;
use eventmon::cli;
use eventmon::logger;
use tracing::error;

fn main() {
    // Must happen before the runtime starts its threads.
    logger::init_offset();

    let args = cli::Args::parse();
    logger::init_logger(logger::level_from_verbosity(args.verbose));
    logger::init_stdlog();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Failed to start runtime: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(cli::main(args)) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
