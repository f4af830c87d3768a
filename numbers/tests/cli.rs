use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use exchange_numbers::{read_number, serve_numbers, write_number, Reply};

const CLIENT: &str = env!("CARGO_BIN_EXE_client");
const SERVER: &str = env!("CARGO_BIN_EXE_server");

/// A port that had a listener a moment ago and has none now
fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Retry until the freshly started server is accepting
fn connect_with_retry(port: u16) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)) {
            return stream;
        }
        thread::sleep(Duration::from_millis(50));
    }
    panic!("server never started listening on port {}", port);
}

fn spawn_server(port: u16, extra_args: &[&str]) -> Child {
    Command::new(SERVER)
        .arg(port.to_string())
        .args(extra_args)
        .stdout(Stdio::piped())
        .spawn()
        .unwrap()
}

/// Send each number and collect the answers, then wait for the server to hang up
fn exchange_all(stream: &mut TcpStream, numbers: &[i32]) -> Vec<i32> {
    let answers = numbers
        .iter()
        .map(|&n| {
            write_number(stream, n).unwrap();
            read_number(stream).unwrap()
        })
        .collect();
    let mut rest = vec![];
    stream.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
    answers
}

#[test]
fn server_increments_until_sentinel_and_exits() {
    let port = unused_port();
    let server = spawn_server(port, &[]);

    let mut stream = connect_with_retry(port);
    assert_eq!(exchange_all(&mut stream, &[41, -5, 0]), vec![42, -4, 1]);

    let output = server.wait_with_output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Connection closed."));
}

#[test]
fn server_echo_flag_answers_unchanged() {
    let port = unused_port();
    let server = spawn_server(port, &["--echo"]);

    let mut stream = connect_with_retry(port);
    assert_eq!(exchange_all(&mut stream, &[7, i32::MIN, 0]), vec![7, i32::MIN, 0]);

    let output = server.wait_with_output().unwrap();
    assert!(output.status.success());
}

#[test]
fn server_reports_busy_port() {
    let busy = TcpListener::bind("0.0.0.0:0").unwrap();
    let port = busy.local_addr().unwrap().port();

    let output = Command::new(SERVER).arg(port.to_string()).output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("could not listen"));
}

#[test]
fn client_without_arguments_prints_usage() {
    let output = Command::new(CLIENT).output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("USAGE"));
}

#[test]
fn server_with_invalid_port_prints_usage() {
    let output = Command::new(SERVER).arg("not-a-port").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn client_reports_refused_connection_without_prompting() {
    let output = Command::new(CLIENT)
        .arg("127.0.0.1")
        .arg(unused_port().to_string())
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Enter a number"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("could not connect"));
}

#[test]
fn client_session_through_stdin() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        serve_numbers(stream, Reply::Increment).unwrap()
    });

    let mut child = Command::new(CLIENT)
        .arg("127.0.0.1")
        .arg(port.to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"41\n0\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Server replied: 42"));
    assert!(stdout.contains("Server replied: 1"));
    assert_eq!(server.join().unwrap(), vec![41, 0]);
}
