#![deny(missing_docs)]
//! A persistent dictionary (key-value) server that maps [`String`] keys to
//! [`String`] values over a line-oriented TCP protocol.
//!
//! This crate provides the storage engines, the connection server, and a
//! [`dictkv-client`] and [`dictkv-server`] executable that can be used to
//! interact with the store. Data is exchanged between client and server using
//! synchronous networking over a plain ASCII protocol.
//!
//! ## Supported Storage Operations
//! The server supports three types of operations (a.k.a "commands"):
//!
//! - `GET <key>` a value associated with a key from the store
//! - `SET <key> <value>` a key/value pair in the store
//! - `DEL <key>` a key/value pair from the store
//!
//! See the [`DictEngine`] trait and the [`Request`] and [`Response`] types
//! for more information on the structure of these operations.
//!
//! ## Wire Protocol
//! Each command is a single ASCII line, tokens separated by spaces and
//! terminated by a newline. The server answers `OK\n` (followed by the value
//! line for a successful `GET`), `NOTFOUND\n` when the key does not exist,
//! or the bare bytes `ERROR:<code>` when a command is malformed or an
//! operation fails. Requests that fail size or encoding validation before
//! parsing are logged and dropped without any response.
//!
//! ## Storage Engines
//! [`FileStore`] is the primary engine. It persists one "unit" file per key
//! under a working directory, holding exactly the value bytes. Client keys
//! are mapped to numeric unit ids through a small JSON index (`units.json`)
//! rather than being used as file names, so path-like keys are harmless.
//! [`SledStore`] wraps the [`sled`] embedded database and honors the same
//! contract; the engine is chosen when starting [`dictkv-server`] and is
//! pinned to the data directory thereafter.
//!
//! ## Client / Server
//! Client and server logic is contained in the [`DictClient`] and
//! [`DictServer`] structs. The server owns the listening socket and an
//! explicit admission capacity (one connection at a time by default);
//! admitted connections are served to completion on a [`ThreadPool`] thread.
//!
//! [`String`]: https://doc.rust-lang.org/std/string/struct.String.html
//! [`sled`]: https://docs.rs/sled/latest/sled/
//! [`DictClient`]: ./struct.DictClient.html
//! [`DictServer`]: ./struct.DictServer.html
//! [`DictEngine`]: ./engine/trait.DictEngine.html
//! [`Request`]: ./enum.Request.html
//! [`Response`]: ./enum.Response.html
//! [`dictkv-server`]: ./dictkv-server.rs
//! [`dictkv-client`]: /dictkv-client.rs

pub use client::DictClient;
pub use command::{Request, Response, MAX_ARGS};
pub use engine::{DictEngine, FileStore, SledStore, MAX_VALUE_SIZE};
pub use error::{DictError, Result};
pub use server::{DictServer, MAX_MESSAGE_SIZE};
pub use thread_pool::{NaiveThreadPool, RayonThreadPool, SharedQueueThreadPool, ThreadPool};

mod client;
mod command;
mod engine;
mod error;
mod server;
pub mod thread_pool;
