use std::io::{self, BufRead, Write};

use anyhow::Context;
use structopt::StructOpt;

use exchange_lines::{trim_line_ending, LinesCodec};

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

    let mut codec = LinesCodec::connect((args.host.as_str(), args.port))
        .with_context(|| format!("could not connect to {}:{}", args.host, args.port))?;

    print!("Message for the server: ");
    io::stdout().flush()?;
    let mut message = String::new();
    io::stdin().lock().read_line(&mut message)?;

    codec
        .send_message(trim_line_ending(&message))
        .context("could not send the message")?;
    let reply = codec.read_message().context("could not read the reply")?;
    println!("Server replies: {}", reply);
    Ok(())
}
