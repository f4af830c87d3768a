//! Fixed-width integer exchange between client <-> server
//!
//! Every message in either direction is a single signed 32-bit integer,
//! most significant byte first. There is no length prefix and no delimiter,
//! both sides simply read exactly 4 bytes at a time:
//! ```ignore
//! |     i32     |
//! |  big endian |
//! ```
//!
//! The client keeps sending numbers until it sends the sentinel `0`,
//! reads the answer to that one too, and hangs up.

use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream, ToSocketAddrs};

use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info, warn};

/// Value that ends a session once it has been answered
pub const SENTINEL: i32 = 0;

/// Write one number to the buffer and flush it, so it goes out right away
pub fn write_number(buf: &mut impl Write, number: i32) -> io::Result<()> {
    buf.write_i32::<NetworkEndian>(number)?;
    buf.flush()
}

/// Block until exactly 4 bytes are available and decode them
pub fn read_number(buf: &mut impl Read) -> io::Result<i32> {
    buf.read_i32::<NetworkEndian>()
}

/// Like [`read_number`], but a stream that ends right at a message boundary
/// yields `None`. A stream that ends part way through a number is still an
/// `UnexpectedEof` error.
pub fn read_next_number(buf: &mut impl Read) -> io::Result<Option<i32>> {
    let mut first = [0u8; 1];
    loop {
        match buf.read(&mut first) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let rest = buf.read_u24::<NetworkEndian>().map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended in the middle of a number",
            )
        } else {
            e
        }
    })?;
    Ok(Some((u32::from(first[0]) << 24 | rest) as i32))
}

/// Parse a line of user input as a number
pub fn parse_number(line: &str) -> io::Result<i32> {
    let line = line.trim();
    line.parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("'{}' is not a valid number: {}", line, e),
        )
    })
}

/// Bind a listener on every interface for the given port
pub fn listen(port: u16) -> io::Result<TcpListener> {
    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
}

/// Client establishes a connection and has Buffered Reader/Writers
pub struct NumberClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl NumberClient {
    /// Establish a connection, wrap stream in BufReader/Writer
    pub fn connect(dest: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(dest)?;
        info!("Connected to {}", stream.peer_addr()?);
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one number and wait for the server's answer
    pub fn exchange(&mut self, number: i32) -> io::Result<i32> {
        write_number(&mut self.writer, number)?;
        read_number(&mut self.reader)
    }
}

/// Interactive loop of the client: prompt on `output`, read a number from
/// `input`, exchange it and print the reply.
///
/// Stops after the reply to [`SENTINEL`] has been printed and returns every
/// reply received. Input that isn't a number ends the session with an
/// `InvalidData` error, running out of input before the sentinel with
/// `UnexpectedEof`.
pub fn run_session(
    client: &mut NumberClient,
    mut input: impl BufRead,
    mut output: impl Write,
) -> io::Result<Vec<i32>> {
    let mut replies = vec![];
    loop {
        write!(output, "Enter a number ({} to quit): ", SENTINEL)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before the sentinel was sent",
            ));
        }
        let number = parse_number(&line)?;

        let reply = client.exchange(number)?;
        writeln!(output, "Server replied: {}", reply)?;
        replies.push(reply);

        if number == SENTINEL {
            return Ok(replies);
        }
    }
}

/// How the server answers each number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Answer with the number plus one
    Increment,
    /// Answer with the number unchanged
    Echo,
}

impl Reply {
    pub fn answer(self, number: i32) -> i32 {
        match self {
            Reply::Increment => number.wrapping_add(1),
            Reply::Echo => number,
        }
    }
}

/// Given a TcpStream:
/// - Read a number
/// - Write back the answer for it
/// - Repeat until the sentinel has been answered or the peer hangs up
///
/// Returns the numbers received, in order. A peer that hangs up part way
/// through a number is an error.
pub fn serve_numbers(stream: TcpStream, reply: Reply) -> io::Result<Vec<i32>> {
    let peer_addr = stream.peer_addr()?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    let mut received = vec![];
    loop {
        let number = match read_next_number(&mut reader)? {
            Some(number) => number,
            None => {
                warn!("{} hung up before sending the sentinel", peer_addr);
                break;
            }
        };
        let answer = reply.answer(number);
        debug!("{} sent {}, answering {}", peer_addr, number, answer);
        received.push(number);
        write_number(&mut writer, answer)?;

        if number == SENTINEL {
            break;
        }
    }
    Ok(received)
}
