use crate::{DictError, Result};
use std::io::{self, Write};
use std::str;

/// the number of arguments a `SET` carries, and the most any command accepts
pub const MAX_ARGS: usize = 2;

// every keyword is the same length, so this is also the shortest valid request
const KEYWORD_LEN: usize = 3;

/// These are the request "commands" a client can send to the dictionary server.
///
/// A request arrives as a single ASCII line, for example `SET color teal\n`,
/// and is turned into one of these variants by [`Request::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// get the value stored under a key
    Get {
        /// the key to look up
        key: String,
    },
    /// store a key/value pair, replacing any previous value
    Set {
        /// the key to store under
        key: String,
        /// the value to store
        value: String,
    },
    /// remove a key and its value
    Del {
        /// the key to remove
        key: String,
    },
}

impl Request {
    /// Parses one raw request line into a [`Request`].
    ///
    /// The rules are those of the wire protocol:
    /// - the keyword is found by substring search, checking `GET`, then `SET`,
    ///   then `DEL`; the first keyword found decides the operation
    /// - the line is then split on whitespace, the first token is dropped
    ///   (positionally, whatever it is), and the remaining tokens become the
    ///   arguments
    /// - `SET` takes exactly two arguments, `GET` and `DEL` exactly one
    ///
    /// # Errors
    /// - [`DictError::NullInput`] for an empty buffer
    /// - [`DictError::BufferTooSmall`] for a buffer shorter than a keyword
    /// - [`DictError::BufferError`] for non-UTF-8 bytes
    /// - [`DictError::InvalidCommand`] when no keyword is present
    /// - [`DictError::TooManyArguments`] when a third argument token appears;
    ///   the check happens before the token is stored, never after
    /// - [`DictError::MissingArgument`] when the argument count is wrong
    pub fn parse(buf: &[u8]) -> Result<Request> {
        if buf.is_empty() {
            return Err(DictError::NullInput);
        }
        if buf.len() < KEYWORD_LEN {
            return Err(DictError::BufferTooSmall);
        }
        let text = str::from_utf8(buf).map_err(|_| DictError::BufferError)?;

        // fixed search order: the first keyword found anywhere in the line wins
        let keyword = if text.contains("GET") {
            Keyword::Get
        } else if text.contains("SET") {
            Keyword::Set
        } else if text.contains("DEL") {
            Keyword::Del
        } else {
            return Err(DictError::InvalidCommand);
        };

        let mut tokens = text.split_ascii_whitespace();
        // the first token is the keyword occurrence, consumed by position
        tokens.next();

        let mut args: Vec<String> = Vec::with_capacity(MAX_ARGS);
        for token in tokens {
            if args.len() == MAX_ARGS {
                return Err(DictError::TooManyArguments);
            }
            args.push(token.to_string());
        }

        match (keyword, args.len()) {
            (Keyword::Set, 2) => {
                let key = args.remove(0);
                let value = args.remove(0);
                Ok(Request::Set { key, value })
            }
            (Keyword::Get, 1) => Ok(Request::Get { key: args.remove(0) }),
            (Keyword::Del, 1) => Ok(Request::Del { key: args.remove(0) }),
            _ => Err(DictError::MissingArgument),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Get,
    Set,
    Del,
}

/// The response types that can be returned for any dictionary server [`Request`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// the operation succeeded and carries no value
    Ok,
    /// a `GET` succeeded and this is the value that was read
    Value(String),
    /// the requested key does not exist
    NotFound,
    /// the operation failed with the given wire code
    Error(u8),
}

impl Response {
    /// Encodes this response onto the wire.
    ///
    /// `OK` and `NOTFOUND` are newline terminated. A successful `GET` is the
    /// `OK` line followed by the value line, sent as two writes. An error is
    /// the bare `ERROR:<code>` bytes with no terminator, exactly as the
    /// protocol defines it.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Response::Ok => writer.write_all(b"OK\n"),
            Response::Value(value) => {
                writer.write_all(b"OK\n")?;
                writer.write_all(format!("{}\n", value).as_bytes())
            }
            Response::NotFound => writer.write_all(b"NOTFOUND\n"),
            Response::Error(code) => write!(writer, "ERROR:{}", code),
        }
    }
}
