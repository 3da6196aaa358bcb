use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialisiere Logging: JSON auf stdout, optional zusätzlich
/// tagesrotierende Logdatei. Der zurückgegebene Guard muss bis zum
/// Prozessende leben.
pub fn init_logging(log_dir: Option<&str>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .json(),
    );

    let guard = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "runclub.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(writer).json())
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    };

    tracing::info!("Logging initialized");
    guard
}
