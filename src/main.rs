use clap::{CommandFactory, Parser};
use stackctl::cli::commands::print_completions;
use stackctl::cli::output;
use stackctl::cli::{execute_command, usage, Cli, CliError, Operation};
use stackctl::config::Settings;
use stackctl::exitcode;
use stackctl::infrastructure::di::ServiceContainer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let code = match run(&cli) {
        Ok(()) => exitcode::OK,
        Err(e) => report(&e),
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let operation = cli.operation()?;
    if let Operation::Completion(shell) = operation {
        eprintln!("Generating completion file for {shell:?}...");
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);
    execute_command(&operation, &container)
}

fn report(e: &CliError) -> i32 {
    if !matches!(e, CliError::Help) {
        output::error(e);
    }
    if e.shows_usage() {
        println!("{}", usage());
    }
    e.exit_code()
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // Create a subscriber with formatted output directed to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr) // Set writer first
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
