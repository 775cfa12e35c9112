mod logging;
mod operator;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use discarchive_core::{
    Config, CopyMethod, DEFAULT_DEVICE, DEFAULT_MOUNT_POINT, DEFAULT_POLL_INTERVAL, DiscTools,
    Session, StopOutcome, StopSignal, SystemTools, label,
};
use operator::ConsoleOperator;
use std::io::{IsTerminal, stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[cfg(unix)]
use libc::ECHOCTL;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;
#[cfg(unix)]
use termios::{TCSANOW, Termios, tcsetattr};

#[derive(Parser)]
#[command(name = "discarchive")]
#[command(about = "Archive the contents of optical discs, one after another", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for discs and archive each one until interrupted
    Run(RunArgs),
    /// Print the drive and disc status once
    Status(DriveArgs),
    /// Print the disc reports and the detected volume label once
    Label(DriveArgs),
}

#[derive(Args)]
struct DriveArgs {
    /// Optical drive device node
    #[arg(short, long, default_value = DEFAULT_DEVICE)]
    device: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    drive: DriveArgs,

    /// Where the mount table exposes the disc
    #[arg(short, long, default_value = DEFAULT_MOUNT_POINT)]
    mount_point: PathBuf,

    /// Seconds between drive status checks
    #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    poll_interval: u64,

    /// Directory in which archives are created
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// How the disc's files are copied
    #[arg(long, value_enum, default_value_t = CopyWith::Native)]
    copy_with: CopyWith,

    /// Hash-compare the copy against the disc before naming it
    #[arg(long)]
    verify: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CopyWith {
    /// Built-in copy with a progress bar
    Native,
    /// `cp -r --preserve=timestamps`
    Cp,
}

impl From<CopyWith> for CopyMethod {
    fn from(value: CopyWith) -> Self {
        match value {
            CopyWith::Native => CopyMethod::Native,
            CopyWith::Cp => CopyMethod::Cp,
        }
    }
}

impl RunArgs {
    fn into_config(self) -> Config {
        Config {
            device: self.drive.device,
            mount_point: self.mount_point,
            poll_interval: Duration::from_secs(self.poll_interval),
            archive_root: self.output,
            copy_method: self.copy_with.into(),
            verify: self.verify,
        }
    }
}

/// A helper struct that, on Unix, disables `ECHOCTL` for the terminal.
///
/// `ECHOCTL` is the terminal flag that causes Ctrl+C to be printed as `^C`.
/// By disabling it, the interrupt handler's own message is the only thing shown
/// when the operator stops the session.
/// The original terminal state is restored by [`TermRestorer::restore`] or on drop.
/// It is shared with the interrupt handler, which exits without unwinding.
struct TermRestorer {
    #[cfg(unix)]
    original_termios: Mutex<Option<Termios>>,
}

impl TermRestorer {
    fn new() -> Self {
        #[cfg(unix)]
        {
            let fd = stdout().as_raw_fd();
            if !stdout().is_terminal() {
                return Self {
                    original_termios: Mutex::new(None),
                };
            }

            let original = Termios::from_fd(fd).ok().filter(|original| {
                let mut new_termios = *original;
                // Disable printing of control characters.
                new_termios.c_lflag &= !ECHOCTL;
                tcsetattr(fd, TCSANOW, &new_termios).is_ok()
            });
            Self {
                original_termios: Mutex::new(original),
            }
        }
        #[cfg(not(unix))]
        {
            // This is a no-op on non-Unix platforms.
            Self {}
        }
    }

    /// Puts the terminal back the way it was. Only the first call has an effect.
    fn restore(&self) {
        #[cfg(unix)]
        if let Ok(mut guard) = self.original_termios.lock() {
            if let Some(original_termios) = guard.take() {
                tcsetattr(stdout().as_raw_fd(), TCSANOW, &original_termios).ok();
            }
        }
    }
}

impl Drop for TermRestorer {
    fn drop(&mut self) {
        self.restore();
    }
}

// Conventional exit status for a process stopped by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Sets up the Ctrl+C handler: one eject, then exit.
///
/// Whoever wins [`StopSignal::claim_eject`] owns the shutdown. If the session loop
/// notices the stop first it ejects and exits itself, and the handler does nothing.
fn install_interrupt_handler(
    signal: StopSignal,
    tools: Arc<SystemTools>,
    term: Arc<TermRestorer>,
) -> Result<()> {
    ctrlc::set_handler(move || {
        signal.request_stop();
        if signal.claim_eject() {
            println!("\nCleaning up.");
            if let Err(e) = tools.eject() {
                eprintln!("{} {}", style("Eject failed:").red().bold(), e);
            }
            term.restore();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
    .context("Failed to install Ctrl+C handler")
}

fn run_session(args: RunArgs) -> Result<()> {
    let config = args.into_config();
    let tools = Arc::new(SystemTools::new(&config));
    let term = Arc::new(TermRestorer::new());
    let signal = StopSignal::new();

    install_interrupt_handler(signal.clone(), tools.clone(), term.clone())?;

    println!("  Device:  {}", style(config.device.display()).cyan());
    println!("  Mount:   {}", style(config.mount_point.display()).cyan());
    println!("  Archive: {}", style(config.archive_root.display()).cyan());
    println!("Press Ctrl+C to eject and stop.\n");

    let operator = ConsoleOperator::new(config.clone());
    let outcome = Session::new(&config, tools.as_ref(), operator, signal).run();
    term.restore();

    match outcome.context("Archive session failed")? {
        StopOutcome::Ejected => {
            println!("\nCleaning up. Stopped.");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        // The handler is ejecting and will exit the process when done.
        StopOutcome::EjectClaimedElsewhere => loop {
            std::thread::park();
        },
    }
}

fn print_status(args: DriveArgs) -> Result<()> {
    let config = Config {
        device: args.device,
        ..Config::default()
    };
    let tools = SystemTools::new(&config);

    let status = tools.drive_status()?;
    println!("  Device: {}", style(config.device.display()).cyan());
    println!("  Drive:  {}", status);
    if status.is_ready() {
        let kind = tools.disc_kind()?;
        println!("  Disc:   {}", kind);
    }
    Ok(())
}

fn print_label(args: DriveArgs) -> Result<()> {
    let config = Config {
        device: args.device,
        ..Config::default()
    };
    let tools = SystemTools::new(&config);

    let detected = label::read_label(&tools).context("Failed to read disc label")?;
    if !detected.info.drive_report.is_empty() {
        println!("{}", detected.info.drive_report.trim_end());
    }
    println!("{}", detected.info.iso_report.trim_end());
    println!(
        "\nVolume name: {}",
        style(&detected.volume_name).cyan().bold()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(logging::LogConfig {
        json: cli.log_json,
        verbose: cli.verbose,
    });

    match cli.command {
        Commands::Run(args) => run_session(args),
        Commands::Status(args) => print_status(args),
        Commands::Label(args) => print_label(args),
    }
}
