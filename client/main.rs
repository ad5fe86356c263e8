// cosim-agent: registers a component on the bus and polls the directory
use clap::{Parser, Subcommand};
use cosim_client::logging::{self, LogConfig};
use cosim_client::{ComponentDescriptor, Session};
use cosim_launcher::BusServer;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

// Time the bus server gets to open its port before the first connect
const SERVER_STARTUP_GRACE: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "cosim-agent")]
#[command(about = "Co-simulation bus agent", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every frame at debug level
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect, register and keep polling the component directory
    Run {
        /// Name of the component to register
        #[arg(long)]
        name: String,

        /// Seconds between directory queries
        #[arg(long, default_value_t = 1)]
        interval: u64,

        /// Query the directory once and exit
        #[arg(long)]
        once: bool,

        /// Start the bus server found under this library directory first
        #[arg(long, value_name = "DIR")]
        server: Option<PathBuf>,
    },
}

fn print_directory(components: &[ComponentDescriptor]) {
    for component in components {
        println!("{}", component.name);
        for variable in &component.variables {
            println!("  {:<24} {}", variable.name, variable.kind);
        }
    }
}

fn poll_directory(name: &str, interval: u64, once: bool) -> cosim_client::Result<()> {
    debug!(%name, "Running a bus agent");
    let mut session = Session::new(name, Vec::new());
    session.connect()?;
    session.register()?;

    loop {
        let components = session.request_component_information()?;
        info!(count = components.len(), "Requested component information");
        print_directory(&components);

        if once {
            break;
        }
        debug!(seconds = interval, "Sleeping");
        thread::sleep(Duration::from_secs(interval));
    }

    session.disconnect()
}

fn run(
    name: &str,
    interval: u64,
    once: bool,
    server: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Kept alive until the session is done; dropping it stops the server
    let _server = match server {
        Some(root) => {
            let server = BusServer::start(&root)?;
            thread::sleep(SERVER_STARTUP_GRACE);
            Some(server)
        }
        None => None,
    };

    poll_directory(name, interval, once)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        logging::init(LogConfig::debug());
    } else {
        logging::init(LogConfig::from_env());
    }

    let result = match cli.command {
        Commands::Run {
            name,
            interval,
            once,
            server,
        } => run(&name, interval, once, server),
    };

    if let Err(e) = result {
        error!(error = %e, "agent stopped");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
