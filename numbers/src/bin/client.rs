use std::io;

use anyhow::Context;
use log::info;
use structopt::StructOpt;

use exchange_numbers::{run_session, NumberClient};

#[derive(Debug, StructOpt)]
#[structopt(name = "client")]
struct Args {
    /// Server host name or IP address
    host: String,
    /// Server port
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::from_args();

    let mut client = NumberClient::connect((args.host.as_str(), args.port))
        .with_context(|| format!("could not connect to {}:{}", args.host, args.port))?;
    println!("Connected to the server.");

    let stdin = io::stdin();
    let replies = run_session(&mut client, stdin.lock(), io::stdout())
        .context("session with the server failed")?;
    info!("Session finished after {} exchanges", replies.len());

    println!("Disconnected from the server.");
    Ok(())
}
