use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Build the JSON subscriber without installing it.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn get_subscriber<Sink>(default_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(sink)
        .with_target(true)
        .json();

    Registry::default().with(env_filter).with(formatting_layer)
}

/// Structured logging for the server: JSON lines on stdout at `info`.
pub fn init_telemetry() {
    get_subscriber("info", std::io::stdout).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_events_are_json_lines() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = get_subscriber("info", move || sink.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user_id = "42", "User logged in");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value =
            serde_json::from_str(output.lines().next().expect("No log line written")).unwrap();

        assert_eq!(line["level"], "INFO");
        assert_eq!(line["fields"]["message"], "User logged in");
        assert_eq!(line["fields"]["user_id"], "42");
    }
}
