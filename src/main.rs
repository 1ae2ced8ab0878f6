use clap::Parser;
use std::io;

mod args;
mod server;

use args::Args;
use server::start_server;

fn main() -> io::Result<()> {
    spaserve::logging::setup_logging();
    let args = Args::parse();
    start_server(args)
}
