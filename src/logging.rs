use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config as LogConfig, Root},
    encode::pattern::PatternEncoder,
};
use log4rs_dynamic_filters::DynamicLevelFilter;
use reqwest::{Method, StatusCode};

/// Logger name used for the per-request log, so it can be silenced on its own.
pub const REQUEST_LOG: &str = "univote::requests";

/// A unique identifier for a particular request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID. This wraps around back to zero if you somehow exceed a usize.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Log an outgoing request.
pub fn log_request(id: RequestId, method: &Method, path: &str) {
    log::info!(target: REQUEST_LOG, "->req{id} {method} {path}");
}

/// Log the response to a request, at a level matching its status class.
pub fn log_response(id: RequestId, status: StatusCode, path: &str) {
    let log_msg = format!("<-rsp{id} {status} {path}");
    if status.is_server_error() {
        log::error!(target: REQUEST_LOG, "{log_msg}");
    } else if status.is_client_error() {
        log::warn!(target: REQUEST_LOG, "{log_msg}");
    } else {
        log::info!(target: REQUEST_LOG, "{log_msg}");
    }
}

/// Log a request that never got a response.
pub fn log_transport_failure(id: RequestId, path: &str, err: &reqwest::Error) {
    log::error!(target: REQUEST_LOG, "<-rsp{id} FAILED {path}: {err}");
}

/// Set up logging from the log4rs file at `path`, or a plain stderr logger
/// at `warn` if the file does not exist.
pub fn init(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        log4rs::init_file(path, log4rs_dynamic_filters::default_deserializers())?;
    } else {
        let stderr = ConsoleAppender::builder()
            .target(log4rs::append::console::Target::Stderr)
            .encoder(Box::new(PatternEncoder::new("{l} {t} - {m}{n}")))
            .build();
        let config = LogConfig::builder()
            .appender(Appender::builder().build("stderr", Box::new(stderr)))
            .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;
        log4rs::init_config(config)?;
    }
    log::info!("Initialised logging");
    Ok(())
}

/// Silence the per-request log. Only takes effect if the log4rs config
/// attaches a dynamic filter named after [`REQUEST_LOG`].
pub fn silence_requests() {
    DynamicLevelFilter::set(REQUEST_LOG, LevelFilter::Off);
}
