use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Level of the logs from the number of `-v` given
fn level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn setup_logging(verbosity: u8) {
    // Logs go to stderr, stdout is kept for the schedule
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level(verbosity))
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Logging was already set up");
    }
}
