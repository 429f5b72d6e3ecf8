use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod cmd_exists;
mod cmd_get;
mod cmd_init;
mod cmd_put;
mod cmd_render;
mod cmd_status;

fn init_logger() {
    // RUST_LOG overrides, default is info.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Init { path } => cmd_init::exec(path),

        cli::Cmd::Get { path, x, y, json, raw } => cmd_get::exec(path, x, y, json, raw),

        cli::Cmd::Put {
            path,
            x,
            y,
            username,
            content,
            id,
        } => cmd_put::exec(path, x, y, username, content, id),

        cli::Cmd::Exists { path, username } => cmd_exists::exec(path, username),

        cli::Cmd::Status { path, json } => cmd_status::exec(path, json),

        cli::Cmd::Render {
            path,
            secret,
            cover,
            out,
        } => cmd_render::exec(path, secret, cover, out),
    }
}
