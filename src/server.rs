use crate::command::{Request, Response};
use crate::thread_pool::ThreadPool;
use crate::{DictEngine, DictError, Result};
use crossbeam::channel::{bounded, Receiver, Sender};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::net::{TcpListener, TcpStream, ToSocketAddrs};
use tracing::{debug, error, info, warn};

/// the largest request line, in bytes, that the server will process
pub const MAX_MESSAGE_SIZE: usize = 4096;

/// A TCP socket server implementation over a key value storage engine.
/// It listens for line-oriented commands (`GET`, `SET`, `DEL`) on a
/// [`SocketAddr`](https://doc.rust-lang.org/std/net/enum.SocketAddr.html),
/// parses each line into a [`Request`], executes it against the engine, and
/// writes the text response back on the same socket.
///
/// Admission is an explicit capacity: the server holds one permit per serving
/// slot and takes a permit *before* accepting, so with the default capacity
/// of one, a second client is not accepted until the first has fully
/// disconnected. Each admitted connection is served to completion on a thread
/// from the [`ThreadPool`].
///
/// # Example
/// Create a server listening on "127.0.0.1:5000", serving one connection at
/// a time from a shared-queue pool, with the file-per-key storage engine
/// ```rust
/// use std::net::SocketAddr;
/// use std::path::Path;
/// use dictkv::{FileStore, DictServer};
/// use dictkv::thread_pool::{SharedQueueThreadPool, ThreadPool};
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let addr: SocketAddr = "127.0.0.1:5000".parse()?;
/// let pool = SharedQueueThreadPool::new(1)?;
/// let engine = FileStore::open(Path::new("."))?;
/// let server = DictServer::new(engine, pool, 1);
/// // start the server
/// //server.run(addr)?;
/// #
/// # Ok(())
/// # }
/// ```
///
/// [`Request`]: ./enum.Request.html
///
pub struct DictServer<E: DictEngine, P: ThreadPool> {
    /// the storage engine to execute commands against
    engine: E,
    /// a pool of threads that serve admitted connections
    pool: P,
    /// serving-slot permits are returned here when a connection ends
    permits: Sender<()>,
    /// the accept loop takes a permit from here before accepting
    available: Receiver<()>,
}

impl<E: DictEngine, P: ThreadPool> DictServer<E, P> {
    /// Create a new `DictServer` using the given [`DictEngine`] and
    /// [`ThreadPool`] implementation, admitting at most `max_connections`
    /// clients at a time (values below one are treated as one).
    pub fn new(engine: E, pool: P, max_connections: usize) -> Self {
        let slots = max_connections.max(1);
        let (permits, available) = bounded(slots);
        for _ in 0..slots {
            // the channel was sized for exactly this many permits
            let _ = permits.send(());
        }
        DictServer {
            engine,
            pool,
            permits,
            available,
        }
    }

    /// starts a server listening on the given address.
    ///
    /// Runs until the process is killed: each admitted connection is serviced
    /// on a pool thread while the accept loop waits for the next free slot.
    ///
    /// # Errors
    /// returns [`DictError`] if the listening socket could not be bound, or
    /// if an accept fails. Both are startup/transport-level failures the
    /// server does not retry.
    ///
    /// [`DictError`]: ./enum.DictError.html
    pub fn run<A: ToSocketAddrs>(self, addr: A) -> Result<()> {
        let listener = TcpListener::bind(addr)?;
        info!("listening on {}", listener.local_addr()?);

        loop {
            // admission policy: a serving slot must be free before accepting
            if self.available.recv().is_err() {
                return Ok(());
            }
            let (stream, peer_addr) = listener.accept()?;
            info!(%peer_addr, "connection accepted");

            let engine = self.engine.clone();
            let permit = self.permits.clone();
            self.pool.spawn(move || {
                if let Err(e) = serve(engine, stream) {
                    error!("error on serving client: {}", e);
                }
                // hand the slot back so the accept loop can admit the next client
                let _ = permit.send(());
            });
        }
    }
}

/// Listens for and processes command lines coming over the given `tcp` stream
/// until the peer disconnects.
///
/// Each line is parsed into a [`Request`], executed against the engine, and
/// answered with a [`Response`]. Requests that fail size or encoding
/// validation are logged and dropped without a response; requests that fail
/// command-level parsing are answered with `ERROR:<code>`.
///
/// [`Request`]: ./enum.Request.html
/// [`Response`]: ./enum.Response.html
///
fn serve<E: DictEngine>(engine: E, tcp: TcpStream) -> Result<()> {
    let peer_addr = tcp.peer_addr()?;
    let mut reader = BufReader::new(tcp.try_clone()?);
    let mut writer = BufWriter::new(tcp);
    let mut line: Vec<u8> = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            // zero bytes read: the peer closed the stream
            Ok(0) => {
                info!(%peer_addr, "peer disconnected");
                break;
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_disconnect(e.kind()) => {
                warn!(%peer_addr, "transport error: {}", e);
                break;
            }
            Err(e) => {
                warn!(%peer_addr, "receive error: {}", e);
                continue;
            }
        }
        debug!(%peer_addr, bytes = line.len(), "request received");

        let request = if line.len() > MAX_MESSAGE_SIZE {
            Err(DictError::BufferError)
        } else {
            Request::parse(&line)
        };

        let response = match request {
            Ok(Request::Get { key }) => match engine.get(key) {
                Ok(Some(value)) => Response::Value(value),
                Ok(None) | Err(DictError::KeyNotFound) => Response::NotFound,
                Err(e) => Response::Error(e.wire_code()),
            },
            Ok(Request::Set { key, value }) => match engine.set(key, value) {
                Ok(()) => Response::Ok,
                Err(e) => Response::Error(e.wire_code()),
            },
            Ok(Request::Del { key }) => match engine.remove(key) {
                Ok(()) => Response::Ok,
                Err(DictError::KeyNotFound) => Response::NotFound,
                Err(e) => Response::Error(e.wire_code()),
            },
            // size/encoding validation failed before parsing: drop the message
            Err(
                e @ (DictError::NullInput | DictError::BufferTooSmall | DictError::BufferError),
            ) => {
                warn!(%peer_addr, "dropping request: {}", e);
                continue;
            }
            Err(e) => {
                warn!(%peer_addr, "rejecting request: {}", e);
                Response::Error(e.wire_code())
            }
        };

        // a failed send is an OS failure for this response only; the receive
        // loop keeps running until the peer goes away
        if let Err(e) = response
            .write_to(&mut writer)
            .and_then(|_| writer.flush())
        {
            let err = DictError::from(e);
            error!(%peer_addr, code = err.wire_code(), "error sending response: {}", err);
        }
    }
    Ok(())
}

/// transport errors that mean the peer is gone and the connection should end
fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
    )
}
