use dictkv::{DictServer, FileStore, SharedQueueThreadPool, ThreadPool};
use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

// grab an ephemeral port from the OS, then release it for the server to take
fn free_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

// starts a server over a fresh FileStore in `dir` and waits until it answers
fn start_server(dir: &TempDir, max_connections: usize) -> SocketAddr {
    let engine = FileStore::open(dir.path()).unwrap();
    let pool = SharedQueueThreadPool::new(max_connections as u32).unwrap();
    let server = DictServer::new(engine, pool, max_connections);
    let addr = free_addr();
    thread::spawn(move || {
        let _ = server.run(addr);
    });

    for _ in 0..100 {
        if TcpStream::connect(addr).is_ok() {
            // the probe connection was dropped; give the server a moment to
            // notice and return its serving slot
            thread::sleep(Duration::from_millis(20));
            return addr;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("server did not start listening on {}", addr);
}

struct TestClient {
    reader: BufReader<TcpStream>,
    stream: TcpStream,
}

impl TestClient {
    fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let reader = BufReader::new(stream.try_clone().unwrap());
        TestClient { reader, stream }
    }

    fn send(&mut self, line: &str) {
        self.stream.write_all(line.as_bytes()).unwrap();
        self.stream.flush().unwrap();
    }

    fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).unwrap();
        line
    }

    // error replies carry no newline, so read whatever bytes arrive
    fn read_raw(&mut self) -> String {
        let mut buf = [0_u8; 64];
        let n = self.reader.read(&mut buf).unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }
}

#[test]
fn sequential_session() {
    let dir = TempDir::new().unwrap();
    let addr = start_server(&dir, 1);

    let mut client = TestClient::connect(addr);
    client.send("SET x 42\n");
    assert_eq!(client.read_line(), "OK\n");

    client.send("GET x\n");
    assert_eq!(client.read_line(), "OK\n");
    assert_eq!(client.read_line(), "42\n");

    client.send("DEL x\n");
    assert_eq!(client.read_line(), "OK\n");

    client.send("GET x\n");
    assert_eq!(client.read_line(), "NOTFOUND\n");
    drop(client);

    // a clean disconnect leaves the server ready for the next connection
    let mut client = TestClient::connect(addr);
    client.send("GET x\n");
    assert_eq!(client.read_line(), "NOTFOUND\n");
}

#[test]
fn del_of_missing_key_is_notfound() {
    let dir = TempDir::new().unwrap();
    let addr = start_server(&dir, 1);

    let mut client = TestClient::connect(addr);
    client.send("DEL nothere\n");
    assert_eq!(client.read_line(), "NOTFOUND\n");
}

#[test]
fn unknown_command_is_answered_with_error() {
    let dir = TempDir::new().unwrap();
    let addr = start_server(&dir, 1);

    let mut client = TestClient::connect(addr);
    client.send("FOO bar\n");
    assert_eq!(client.read_raw(), "ERROR:5");
}

#[test]
fn missing_argument_is_answered_and_key_is_not_created() {
    let dir = TempDir::new().unwrap();
    let addr = start_server(&dir, 1);

    let mut client = TestClient::connect(addr);
    client.send("SET onlykey\n");
    assert_eq!(client.read_raw(), "ERROR:6");
    drop(client);

    let mut client = TestClient::connect(addr);
    client.send("GET onlykey\n");
    assert_eq!(client.read_line(), "NOTFOUND\n");
}

#[test]
fn over_argument_is_answered_with_error() {
    let dir = TempDir::new().unwrap();
    let addr = start_server(&dir, 1);

    let mut client = TestClient::connect(addr);
    client.send("GET a b c\n");
    assert_eq!(client.read_raw(), "ERROR:7");
}

#[test]
fn second_connection_waits_for_the_first_to_disconnect() {
    let dir = TempDir::new().unwrap();
    let addr = start_server(&dir, 1);

    // the first client occupies the single serving slot
    let mut first = TestClient::connect(addr);
    first.send("SET a 1\n");
    assert_eq!(first.read_line(), "OK\n");

    // the second client connects (the OS queues the handshake) and sends a
    // command, but is not served while the first client is still connected
    let mut second = TestClient::connect(addr);
    second
        .stream
        .set_read_timeout(Some(Duration::from_millis(300)))
        .unwrap();
    second.send("SET b 2\n");
    let mut buf = [0_u8; 8];
    let err = second.reader.read(&mut buf).unwrap_err();
    assert!(
        err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut,
        "second client was served while the first was still connected"
    );

    // once the first client disconnects, the second is admitted and served
    drop(first);
    second
        .stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    assert_eq!(second.read_line(), "OK\n");
}
