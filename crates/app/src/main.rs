mod args;
mod op;
mod ops;
mod state;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{Get, History, Init, Link, Ls, Put, Stat, Version};

command_enum! {
    (Init, Init),
    (Put, Put),
    (Get, Get),
    (Stat, Stat),
    (History, History),
    (Ls, Ls),
    (Link, Link),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let ctx = op::OpContext::new(args.config_path);
    let guards = ctx.init_logging();

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            let output = output.to_string();
            if !output.is_empty() {
                println!("{}", output);
            }
            0
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush buffered logs before exiting
    drop(guards);
    std::process::exit(code);
}
