use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::{DictError, Result};
use tracing::debug;

// an error reply is at least "ERROR:" plus one code digit
const MIN_ERROR_REPLY: usize = 7;

/// `DictClient` contains the functionality for communication with a [`DictServer`]
///
/// It speaks the server's line protocol: one command line out, then a status
/// line (`OK` or `NOTFOUND`) back, plus a value line for a successful `GET`.
/// Error replies are the bare `ERROR:<code>` bytes with no terminator, so
/// they are picked out of the buffered stream rather than read as a line.
///
/// [`DictServer`]: ./struct.DictServer.html
pub struct DictClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// the decoded status portion of a server reply
enum Status {
    Ok,
    NotFound,
    Error(u8),
}

impl DictClient {
    /// creates a client and establishes a socket connection to the server at the given `addr`
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        let tcp_writer = tcp_reader.try_clone()?;

        Ok(DictClient {
            reader: BufReader::new(tcp_reader),
            writer: BufWriter::new(tcp_writer),
        })
    }

    /// gets the value of the specified `key` from the server
    /// ## Returns
    /// `Ok<Some<String>>` if a value was found for the key.
    /// `Ok<None>` if there is no value associated with the key
    /// `Err<DictError>` if the server replied with an error code
    pub fn get(&mut self, key: String) -> Result<Option<String>> {
        writeln!(self.writer, "GET {}", key)?;
        self.writer.flush()?;

        match self.read_status()? {
            Status::Ok => {
                let value = self.read_line()?;
                Ok(Some(value))
            }
            Status::NotFound => Ok(None),
            Status::Error(code) => Err(server_error(code)),
        }
    }

    /// sends a set key/value request to the server
    /// # Errors
    /// `Err<DictError>` if the server replied with an error code
    pub fn set(&mut self, key: String, value: String) -> Result<()> {
        writeln!(self.writer, "SET {} {}", key, value)?;
        self.writer.flush()?;

        match self.read_status()? {
            Status::Ok => Ok(()),
            Status::NotFound => Err(DictError::KeyNotFound),
            Status::Error(code) => Err(server_error(code)),
        }
    }

    /// removes a key and its associated value from the store
    /// # Errors
    /// `Err<DictError::KeyNotFound>` if the key did not exist on the server
    pub fn del(&mut self, key: String) -> Result<()> {
        writeln!(self.writer, "DEL {}", key)?;
        self.writer.flush()?;

        match self.read_status()? {
            Status::Ok => Ok(()),
            Status::NotFound => Err(DictError::KeyNotFound),
            Status::Error(code) => Err(server_error(code)),
        }
    }

    /// reads the status portion of a reply
    fn read_status(&mut self) -> Result<Status> {
        let available = self.reader.fill_buf()?;
        if available.is_empty() {
            return Err(unexpected_eof());
        }

        // OK and NOTFOUND are newline terminated; an error reply is not, and
        // is recognized by its leading byte
        if available[0] == b'E' {
            let mut reply = available.to_vec();
            let buffered = reply.len();
            self.reader.consume(buffered);
            while reply.len() < MIN_ERROR_REPLY {
                let mut byte = [0_u8; 1];
                let n = self.reader.read(&mut byte)?;
                if n == 0 {
                    break;
                }
                reply.extend_from_slice(&byte[..n]);
            }
            let text = String::from_utf8_lossy(&reply).into_owned();
            debug!("server replied {}", text.trim_end());
            let code = text
                .strip_prefix("ERROR:")
                .and_then(|digits| digits.trim().parse().ok())
                .unwrap_or(0);
            return Ok(Status::Error(code));
        }

        let line = self.read_line()?;
        debug!("server replied {}", line);
        match line.as_str() {
            "OK" => Ok(Status::Ok),
            "NOTFOUND" => Ok(Status::NotFound),
            other => Err(DictError::Parsing(format!(
                "unexpected server reply: {}",
                other
            ))),
        }
    }

    /// reads one newline terminated reply line, without its terminator
    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(unexpected_eof());
        }
        Ok(line.trim_end().to_string())
    }
}

fn server_error(code: u8) -> DictError {
    DictError::Parsing(format!("server replied ERROR:{}", code))
}

fn unexpected_eof() -> DictError {
    DictError::Os(io::Error::new(
        ErrorKind::UnexpectedEof,
        "server closed the connection",
    ))
}
