use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize the logger with elapsed-time prefixes on stderr.
///
/// `verbose` raises the default level from Warn to Info. `RUST_LOG` is
/// applied on top. Output format: [HH:MM:SS] LEVEL: message
pub fn init_logger(verbose: bool) {
    let start = *START_TIME.get_or_init(Instant::now);

    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            let elapsed = start.elapsed().as_secs();
            writeln!(
                buf,
                "[{:02}:{:02}:{:02}] {}: {}",
                elapsed / 3600,
                (elapsed % 3600) / 60,
                elapsed % 60,
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .try_init();
}
