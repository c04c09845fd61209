//! The dictkv-client executable supports the following command line arguments:
//!
//! `dictkv-client set <KEY> <VALUE> [--addr IP-PORT]`
//!
//!     Set the value of a string key to a string.
//!     --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT. If --addr is not specified then connect on 127.0.0.1:5000.
//!     Print an error and return a non-zero exit code on server error, or if IP-PORT does not parse as an address.
//!
//! `dictkv-client get <KEY> [--addr IP-PORT]`
//!
//!     Get the string value of a given string key.
//!     --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT. If --addr is not specified then connect on 127.0.0.1:5000.
//!     Print an error and return a non-zero exit code on server error, or if IP-PORT does not parse as an address.
//!
//! `dictkv-client del <KEY> [--addr IP-PORT]`
//!
//!     Delete a given string key.
//!     --addr accepts an IP address, either v4 or v6, and a port number, with the format IP:PORT. If --addr is not specified then connect on 127.0.0.1:5000.
//!     Print an error and return a non-zero exit code on server error, or if IP-PORT does not parse as an address. A "key not found" is also treated as an error in the "del" command.
//!
//! `dictkv-client -V`
//!
//!     Print the version.

use clap::{crate_version, App, Arg, SubCommand};
use dictkv::{DictClient, DictError, Request, Result};
use std::net::SocketAddr;
use std::process::exit;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    /// the server's ip:port
    addr: SocketAddr,
    req: Request,
}

impl Opt {
    /// validates the `addr` parameter is a valid IP address and PORT
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`DictError::Parsing`] if one of the parameters is invalid
    ///
    fn build(addr: &str, req: Request) -> Result<Opt> {
        let addr: SocketAddr = addr.parse().map_err(|_| {
            DictError::Parsing(format!(
                "could not parse {} into an IP address and port",
                &addr
            ))
        })?;

        Ok(Opt { addr, req })
    }
}

fn main() {
    subscriber_config();

    let matches = App::new("dictkv-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("command line client for the dictkv server")
        .arg(
            Arg::with_name("addr")
                .long("addr")
                .value_name("IP_ADDR:PORT")
                .help("the IP_ADDR:PORT of the server to connect to")
                .default_value(DEFAULT_ADDRESS)
                // usable both before and after the subcommand
                .global(true),
        )
        .subcommands(vec![
            SubCommand::with_name("set")
                .about("Set the value of a string key to a string")
                .arg(Arg::with_name("KEY").required(true).index(1))
                .arg(Arg::with_name("VALUE").required(true).index(2)),
            SubCommand::with_name("get")
                .about("Get the string value of a given string key")
                .arg(Arg::with_name("KEY").required(true).index(1)),
            SubCommand::with_name("del")
                .about("Deletes a given key")
                .arg(Arg::with_name("KEY").required(true).index(1)),
        ])
        .get_matches();

    let addr = matches.value_of("addr").unwrap();

    let req = match matches.subcommand() {
        ("set", Some(args)) => {
            let key = args.value_of("KEY").map(String::from).unwrap();
            let value = args.value_of("VALUE").map(String::from).unwrap();
            Request::Set { key, value }
        }
        ("get", Some(args)) => {
            let key = args.value_of("KEY").map(String::from).unwrap();
            Request::Get { key }
        }
        ("del", Some(args)) => {
            let key = args.value_of("KEY").map(String::from).unwrap();
            Request::Del { key }
        }
        _ => {
            eprintln!("a subcommand of 'get', 'set' or 'del' is required");
            exit(1);
        }
    };

    let opt = match Opt::build(addr, req) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    let mut client = DictClient::connect(opt.addr)?;

    match opt.req {
        Request::Get { key } => match client.get(key)? {
            Some(value) => println!("{}", value),
            None => println!("Key not found"),
        },
        Request::Set { key, value } => client.set(key, value)?,
        Request::Del { key } => client.del(key)?,
    }
    Ok(())
}

/// configures a tracing subscriber that will log warnings and errors to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
