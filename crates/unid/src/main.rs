use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;
use tracing::debug;

use unid::commands::Cli;
use unid::commands::Commands;
use unid::handlers;
use unid::telemetry::init_tracing;
use unid_core::IdentityError;
use unid_daemon::DaemonError;
use unid_daemon::start_daemon;
use unid_ipc::ClientError;
use unid_ipc::ensure_daemon;

fn main() {
    if let Err(e) = run() {
        let error = e.as_ref();
        eprintln!("Error: {}", error);

        if let Some(client_error) = error.downcast_ref::<ClientError>() {
            if let Some(suggestion) = client_error.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            if client_error.is_retryable() {
                eprintln!("(This error may be transient - retry may succeed)");
            }
        } else if let Some(daemon_error) = error.downcast_ref::<DaemonError>() {
            eprintln!("Suggestion: {}", daemon_error.suggestion());
        }

        std::process::exit(exit_code_for(error));
    }
}

/// Maps an error to its sysexits code: 64 for unrecognized operations,
/// 74 for daemon, transport, and OS identifier-source failures.
fn exit_code_for(error: &(dyn std::error::Error + 'static)) -> i32 {
    if let Some(client_error) = error.downcast_ref::<ClientError>() {
        return exit_code_for_client_error(client_error);
    }
    if error.downcast_ref::<DaemonError>().is_some()
        || error.downcast_ref::<IdentityError>().is_some()
    {
        return 74; // EX_IOERR
    }
    1
}

fn exit_code_for_client_error(error: &ClientError) -> i32 {
    use unid_ipc::error_codes::ErrorCategory;

    match error.category() {
        Some(ErrorCategory::NotImplemented) => 64, // EX_USAGE
        Some(ErrorCategory::External) => 74,       // EX_IOERR
        Some(ErrorCategory::Internal) => 74,       // EX_IOERR
        None => 1,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing("warn");
    debug!("unid {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Daemon => start_daemon().map_err(Into::into),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "unid", &mut std::io::stdout());
            Ok(())
        }

        Commands::Id { local: true } => {
            println!("{}", handlers::handle_local_id(cli.json)?);
            Ok(())
        }

        Commands::Id { local: false } => {
            debug!("resolving identifier via daemon");
            let mut client = ensure_daemon()?;
            println!("{}", handlers::handle_id(&mut client, cli.json)?);
            Ok(())
        }

        Commands::Status => {
            println!("{}", handlers::handle_status(cli.json));
            Ok(())
        }

        Commands::Stop => {
            println!("{}", handlers::handle_stop(cli.json)?);
            Ok(())
        }
    }
}
