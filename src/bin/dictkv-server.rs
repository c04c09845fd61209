//! this binary starts the dictionary server
//! to see the list of options, type: `dictkv-server --help`

use clap::{arg_enum, crate_version, value_t, App, Arg};
use dictkv::{
    DictEngine, DictError, DictServer, FileStore, Result, SharedQueueThreadPool, SledStore,
    ThreadPool,
};
use std::env::current_dir;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

arg_enum! {
    #[allow(non_camel_case_types)]
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Engine {
        files,
        sled
    }
}

// the original server's fixed address and port
const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";
const DEFAULT_ENGINE: Engine = Engine::files;
// at most one client served at a time unless configured otherwise
const DEFAULT_MAX_CONNECTIONS: &str = "1";
// the name, file stem, of the "engine" marker file
const DEFAULT_ENGINE_FILE: &str = "engine";

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    addr: SocketAddr,
    engine: Engine,
    data_dir: PathBuf,
    max_connections: usize,
}

impl Opt {
    /// validates the command line parameters
    /// returns `Ok<Opt>` if everything is valid
    /// # Errors
    /// returns [`DictError::Parsing`] if one of the parameters is invalid
    ///
    fn build(
        addr: &str,
        req_engine: Engine,
        data_dir: Option<&str>,
        max_connections: &str,
    ) -> Result<Opt> {
        let addr: SocketAddr = addr.parse().map_err(|_| {
            DictError::Parsing(format!(
                "could not parse {} into an IP address and port",
                &addr
            ))
        })?;

        let data_dir = match data_dir {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };

        let max_connections: usize = max_connections.parse().map_err(|_| {
            DictError::Parsing(format!(
                "could not parse {} into a connection count",
                &max_connections
            ))
        })?;
        if max_connections == 0 {
            return Err(DictError::Parsing(
                "max-connections must be at least 1".to_string(),
            ));
        }

        // the requested engine, if an engine file exists, must match the engine
        // already in use for this data directory
        let engine = match current_engine(&data_dir)? {
            None => req_engine,
            Some(cur_engine) if req_engine == cur_engine => cur_engine,
            Some(cur_engine) => {
                return Err(DictError::Parsing(format!(
                    "the requested engine: {} does not match the engine currently in use: {}",
                    req_engine, cur_engine
                )))
            }
        };

        Ok(Opt {
            addr,
            engine,
            data_dir,
            max_connections,
        })
    }
}

fn main() {
    // set up a tracing subscriber to log to STDERR
    subscriber_config();

    // parse command line args
    let matches = App::new("dictkv-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a line-oriented TCP dictionary server")
        .arg(
            Arg::with_name("addr")
                .long("addr")
                .value_name("IP_ADDR:PORT")
                .help("sets the IP_ADDR:PORT that the server listens on")
                .default_value(DEFAULT_ADDRESS),
        )
        .arg(
            Arg::with_name("engine")
                .long("engine")
                .value_name("ENGINE_NAME")
                .help("sets the storage engine to use, either 'files' or 'sled'")
                .default_value("files"),
        )
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .value_name("PATH")
                .help("directory where the store's data is kept, defaults to the current directory"),
        )
        .arg(
            Arg::with_name("max-connections")
                .long("max-connections")
                .value_name("N")
                .help("how many client connections may be served at the same time")
                .default_value(DEFAULT_MAX_CONNECTIONS),
        )
        .get_matches();

    // validate command line options, store them in Opt
    let addr = matches.value_of("addr").unwrap();
    let req_engine: Engine = value_t!(matches, "engine", Engine)
        .ok()
        .unwrap_or(DEFAULT_ENGINE);
    let data_dir = matches.value_of("data-dir");
    let max_connections = matches.value_of("max-connections").unwrap();
    let opt = match Opt::build(addr, req_engine, data_dir, max_connections) {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{}", err);
            exit(1);
        }
    };

    // start the server
    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    info!("dictkv-server {}", env!("CARGO_PKG_VERSION"));
    info!("Storage engine: {}", opt.engine);
    info!("Serving at most {} connection(s)", opt.max_connections);
    info!("Listening on {}", opt.addr);

    // pin the chosen engine to the data directory
    fs::create_dir_all(&opt.data_dir)?;
    fs::write(
        opt.data_dir.join(DEFAULT_ENGINE_FILE),
        format!("{}", opt.engine),
    )?;

    match opt.engine {
        Engine::files => run_with_engine(FileStore::open(&opt.data_dir)?, &opt),
        Engine::sled => run_with_engine(SledStore::open(&opt.data_dir.join("sled"))?, &opt),
    }
}

fn run_with_engine<E: DictEngine>(engine: E, opt: &Opt) -> Result<()> {
    let pool = SharedQueueThreadPool::new(opt.max_connections as u32)?;
    let server = DictServer::new(engine, pool, opt.max_connections);
    server.run(opt.addr)
}

/// determines if there is an "engine" file in the data directory and returns
/// the value of that file, else None
///
/// returns `Ok(None)` if an "engine" file does not (yet) exist, `Some(Engine)`
/// if the engine file exists and was parsed successfully
///
fn current_engine(data_dir: &PathBuf) -> Result<Option<Engine>> {
    let engine = data_dir.join(DEFAULT_ENGINE_FILE);
    if !engine.exists() {
        return Ok(None);
    }

    match fs::read_to_string(engine)?.parse() {
        Ok(engine) => Ok(Some(engine)),
        Err(e) => {
            // file is corrupted or invalid contents
            warn!("The content of the engine file is invalid: {}", e);
            Ok(None)
        }
    }
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        // all spans/events with a level higher than TRACE (e.g, debug, info, warn, etc.)
        // will be logged
        .with_max_level(Level::TRACE)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
