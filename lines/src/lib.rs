//! Newline-delimited text exchange: one request line in, one greeting out

use std::io::{self, BufRead, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream, ToSocketAddrs};

use log::{debug, info};

/// Fixed answer the server gives to whatever line it receives
pub const GREETING: &str = "Hola que tal";

/// Reads and writes whole lines over a TcpStream
pub struct LinesCodec {
    reader: io::BufReader<TcpStream>,
    writer: io::LineWriter<TcpStream>,
}

impl LinesCodec {
    /// Encapsulate a TcpStream with reader/writer functionality
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let writer = io::LineWriter::new(stream.try_clone()?);
        let reader = io::BufReader::new(stream);
        Ok(Self { reader, writer })
    }

    /// Connect to a server and wrap the new stream
    pub fn connect(dest: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(dest)?;
        info!("Connected to {}", stream.peer_addr()?);
        Self::new(stream)
    }

    /// Write this line (with a '\n' suffix) to the TcpStream
    pub fn send_message(&mut self, message: &str) -> io::Result<()> {
        self.writer.write_all(message.as_bytes())?;
        // LineWriter flushes as soon as it sees the newline
        self.writer.write_all(b"\n")
    }

    /// Read one line from the TcpStream, without its line terminator.
    ///
    /// A peer that closes without sending anything yields an empty message.
    /// Bytes that aren't valid UTF-8 are replaced with U+FFFD.
    pub fn read_message(&mut self) -> io::Result<String> {
        let mut bytes = vec![];
        if self.reader.read_until(b'\n', &mut bytes)? == 0 {
            debug!("Stream ended before a line was received");
        }
        Ok(trim_line_ending(&String::from_utf8_lossy(&bytes)).to_string())
    }
}

/// Strip a trailing `\n` or `\r\n`, leaving any other whitespace alone
pub fn trim_line_ending(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => line,
    }
}

/// Bind a listener on every interface for the given port
pub fn listen(port: u16) -> io::Result<TcpListener> {
    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
}

/// Accept exactly one connection, read one line, print it to `output`
/// and answer with [`GREETING`].
///
/// The connection is closed when this returns. Returns the line received.
pub fn serve_once(listener: &TcpListener, mut output: impl Write) -> io::Result<String> {
    let (stream, peer_addr) = listener.accept()?;
    info!("Client connected from {}", peer_addr);
    let mut codec = LinesCodec::new(stream)?;

    let message = codec.read_message()?;
    writeln!(output, "Client says: {}", message)?;
    output.flush()?;
    codec.send_message(GREETING)?;
    Ok(message)
}
