//! Diagnostic logging setup.
//!
//! The engine emits `tracing` events and never installs a subscriber itself,
//! so without [`init`] every event is discarded. Embedders that want the
//! diagnostics call [`init`] (stderr) or [`init_with_writer`] (any sink) and
//! keep the returned [`LogHandle`] to switch logging on, off, or to a
//! different filter at runtime.

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

/// Filter directive that drops everything.
const OFF: &str = "off";

/// Errors that can occur while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("global log subscriber already installed")]
    AlreadyInitialized,

    #[error("log subscriber is gone: {0}")]
    Reload(String),
}

/// Runtime control over the installed log filter.
#[derive(Clone)]
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Replaces the active filter, e.g. `"chatflow=trace"`.
    pub fn set_filter(&self, directive: &str) -> Result<(), TelemetryError> {
        let filter = parse_filter(directive)?;
        self.filter
            .reload(filter)
            .map_err(|e| TelemetryError::Reload(e.to_string()))
    }

    /// Turns logging on with `directive`.
    pub fn enable(&self, directive: &str) -> Result<(), TelemetryError> {
        self.set_filter(directive)
    }

    /// Discards every event until re-enabled.
    pub fn disable(&self) -> Result<(), TelemetryError> {
        self.set_filter(OFF)
    }
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Builds a subscriber writing to `writer` without installing it.
///
/// Useful for scoping diagnostics to one task or test with
/// `tracing::dispatcher::with_default`.
pub fn dispatch_with_writer<W>(
    config: &LoggingConfig,
    writer: W,
) -> Result<(Dispatch, LogHandle), TelemetryError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let directive = if config.enabled { config.filter.as_str() } else { OFF };
    let (filter, handle) = reload::Layer::new(parse_filter(directive)?);

    let output = if config.json {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(output);
    Ok((Dispatch::new(subscriber), LogHandle { filter: handle }))
}

/// Installs the global subscriber, writing to `writer`.
pub fn init_with_writer<W>(config: &LoggingConfig, writer: W) -> Result<LogHandle, TelemetryError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let (dispatch, handle) = dispatch_with_writer(config, writer)?;
    dispatch
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInitialized)?;
    Ok(handle)
}

/// Installs the global subscriber, writing to stderr.
pub fn init(config: &LoggingConfig) -> Result<LogHandle, TelemetryError> {
    init_with_writer(config, std::io::stderr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn config(enabled: bool, json: bool) -> LoggingConfig {
        LoggingConfig {
            enabled,
            filter: "debug".to_string(),
            json,
        }
    }

    fn capture(config: &LoggingConfig) -> (Dispatch, LogHandle, Buffer) {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let (dispatch, handle) = dispatch_with_writer(config, move || sink.clone()).unwrap();
        (dispatch, handle, buffer)
    }

    #[test]
    fn disabled_config_discards_events() {
        let (dispatch, _handle, buffer) = capture(&config(false, false));
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!("should not appear");
        });
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn enabled_config_writes_events() {
        let (dispatch, _handle, buffer) = capture(&config(true, false));
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(user_id = 1234, "turn handled");
        });
        let out = buffer.contents();
        assert!(out.contains("turn handled"));
        assert!(out.contains("user_id=1234"));
    }

    #[test]
    fn json_output_is_one_object_per_event() {
        let (dispatch, _handle, buffer) = capture(&config(true, true));
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::warn!(step = "Step1", "send failed");
        });
        let line = buffer.contents();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["fields"]["step"], "Step1");
        assert_eq!(value["level"], "WARN");
    }

    #[test]
    fn handle_toggles_output_at_runtime() {
        let (dispatch, handle, buffer) = capture(&config(false, false));
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!("first");
            handle.enable("info").unwrap();
            tracing::info!("second");
            handle.disable().unwrap();
            tracing::info!("third");
        });
        let out = buffer.contents();
        assert!(!out.contains("first"));
        assert!(out.contains("second"));
        assert!(!out.contains("third"));
    }

    #[test]
    fn invalid_directive_is_rejected() {
        let (_dispatch, handle, _buffer) = capture(&config(true, false));
        let err = handle.set_filter("chatflow=notalevel").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
    }
}
