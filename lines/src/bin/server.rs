use std::io;

use anyhow::Context;
use structopt::StructOpt;

use exchange_lines::{listen, serve_once};

#[derive(Debug, StructOpt)]
#[structopt(name = "server")]
struct Args {
    /// Port to listen on (all interfaces)
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::from_args();

    let listener =
        listen(args.port).with_context(|| format!("could not listen on port {}", args.port))?;
    println!("Server waiting for connections on port {}", args.port);

    // Single-shot: the listener is dropped as soon as one client was served
    serve_once(&listener, io::stdout()).context("exchange with the client failed")?;
    Ok(())
}
