use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use tracing::{info, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use nodemcutil::{Options, SystemCatalog, TomlSettings};

#[derive(Parser, Clone)]
#[command(version, about = "Serial tool for NodeMCU")]
pub struct Args {
    #[arg(
        short,
        long,
        value_name = "PORT",
        allow_negative_numbers = true,
        help = "Use <port> (name or index from --listports)"
    )]
    port: Option<String>,

    #[arg(
        short,
        long,
        value_name = "SPEED",
        allow_negative_numbers = true,
        help = "Use <speed> baud (default 9600)"
    )]
    baud: Option<String>,

    #[arg(short, long, help = "Use verbose output")]
    verbose: bool,

    #[arg(short, long = "listports", help = "List available serial ports")]
    list_ports: bool,

    #[arg(
        long,
        value_name = "FILE",
        env = "NODEMCUTIL_SETTINGS",
        help = "Settings file (defaults to the platform config directory)"
    )]
    settings: Option<PathBuf>,
}

impl From<&Args> for Options {
    fn from(args: &Args) -> Self {
        Options {
            port: args.port.clone(),
            baud: args.baud.clone(),
            list_ports: args.list_ports,
        }
    }
}

fn log_subscriber<W>(filter: EnvFilter, writer: W, ansi: bool) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    // Diagnostics share stdout with the listing, so keep them plain.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_level(false)
        .with_target(false)
        .without_time()
        .finish()
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = log_subscriber(filter, std::io::stdout, std::io::stdout().is_terminal());

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let options = Options::from(&args);
    let help = Args::command().render_help().to_string();
    let mut stdout = std::io::stdout().lock();

    let result = match args.settings {
        Some(path) => TomlSettings::open(path),
        None => TomlSettings::open_default(),
    }
    .map_err(nodemcutil::Error::from)
    .and_then(|mut store| {
        info!("using settings at {}", store.path().display());
        nodemcutil::run(&options, &mut store, &SystemCatalog, &help, &mut stdout)
    });
    drop(stdout);

    if let Err(e) = result {
        println!("error: {e}");
        ::std::process::exit(e.exit_code());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn negative_port_index_reaches_the_port_option() {
        let args = parse(&["nodemcutil", "-p", "-1"]);
        assert_eq!(args.port.as_deref(), Some("-1"));

        let args = parse(&["nodemcutil", "--port", "-3", "-l"]);
        assert_eq!(args.port.as_deref(), Some("-3"));
        assert!(args.list_ports);
    }

    #[test]
    fn negative_baud_reaches_the_baud_option() {
        let args = parse(&["nodemcutil", "-b", "-9600"]);
        assert_eq!(args.baud.as_deref(), Some("-9600"));
    }

    #[test]
    fn short_and_long_flags() {
        let args = parse(&["nodemcutil", "-v", "--listports", "--port", "COM3", "-b", "115200"]);

        assert!(args.verbose);
        assert_eq!(
            Options::from(&args),
            Options {
                port: Some("COM3".into()),
                baud: Some("115200".into()),
                list_ports: true,
            }
        );
    }

    #[test]
    fn no_flags_means_no_command() {
        let args = parse(&["nodemcutil"]);

        assert!(!args.verbose);
        assert_eq!(Options::from(&args), Options::default());
    }

    #[test]
    fn port_requires_a_value() {
        assert!(Args::try_parse_from(["nodemcutil", "-p"]).is_err());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn diagnostics_are_bare_lines_when_piped() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = log_subscriber(EnvFilter::new("debug"), move || writer.clone(), false);

        tracing::subscriber::with_default(subscriber, || {
            info!("read default baudrate 9600 baud");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(!output.contains('\u{1b}'), "{output:?}");
        assert!(!output.contains("INFO"), "{output:?}");
        assert_eq!(output.trim(), "read default baudrate 9600 baud");
    }

    #[test]
    fn warn_filter_hides_verbose_diagnostics() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = log_subscriber(EnvFilter::new("warn"), move || writer.clone(), false);

        tracing::subscriber::with_default(subscriber, || {
            info!("now using default baudrate 115200 baud");
        });

        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }
}
