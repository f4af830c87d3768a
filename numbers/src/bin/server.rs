use anyhow::Context;
use log::info;
use structopt::StructOpt;

use exchange_numbers::{listen, serve_numbers, Reply};

#[derive(Debug, StructOpt)]
#[structopt(name = "server")]
struct Args {
    /// Port to listen on (all interfaces)
    port: u16,
    /// Echo numbers back unchanged instead of adding one
    #[structopt(long)]
    echo: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::from_args();
    let reply = if args.echo { Reply::Echo } else { Reply::Increment };

    let listener =
        listen(args.port).with_context(|| format!("could not listen on port {}", args.port))?;
    println!("Waiting for a connection on port {}...", args.port);

    // Single-shot: one peer, then the listener is dropped
    let (stream, peer_addr) = listener.accept().context("could not accept a connection")?;
    println!("Connection accepted from {}.", peer_addr);

    let received = serve_numbers(stream, reply)
        .with_context(|| format!("exchange with {} failed", peer_addr))?;
    info!("Answered {} numbers from {} ({:?})", received.len(), peer_addr, reply);

    println!("Connection closed.");
    Ok(())
}
