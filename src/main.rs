mod commands;
mod input;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clinic_core::clinic::Clinic;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `CLINIC_LOG=debug`).
const LOG_ENV: &str = "CLINIC_LOG";

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Book, edit and cancel clinic appointments from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in (no credentials are checked)
    Login,
    /// Log out
    Logout,
    /// Show session and storage status
    Status,
    /// Browse and edit the calendar interactively (default)
    Open,
    /// Show the calendar
    Calendar {
        /// Day or week to show (YYYY-MM-DD, "today", "fri", ...)
        #[arg(short, long)]
        date: Option<String>,

        /// Only show this patient's appointments
        #[arg(long)]
        patient: Option<String>,

        /// Only show this doctor's appointments
        #[arg(long)]
        doctor: Option<String>,

        /// Show the day list regardless of terminal width
        #[arg(long, conflicts_with = "grid")]
        list: bool,

        /// Show the week grid regardless of terminal width
        #[arg(long)]
        grid: bool,

        /// Print the visible appointments as JSON
        #[arg(long)]
        json: bool,
    },
    /// Book an appointment (prompts for anything missing)
    Add {
        #[arg(long)]
        patient: Option<String>,

        #[arg(long)]
        doctor: Option<String>,

        /// Day of the appointment (YYYY-MM-DD, "tomorrow", "fri", ...)
        #[arg(short, long)]
        date: Option<String>,

        /// Start time (HH:MM); appointments last one hour
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Change an appointment (prompts when no field is given)
    Edit {
        id: String,

        #[arg(long)]
        patient: Option<String>,

        #[arg(long)]
        doctor: Option<String>,

        /// New start time (HH:MM)
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Cancel an appointment
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// List the patients and doctors that can be booked
    Roster,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let clinic = Clinic::load()?;
    tracing::debug!(data = %clinic.data_path().display(), "loaded clinic config");

    match cli.command.unwrap_or(Commands::Open) {
        Commands::Login => commands::session::login(&clinic),
        Commands::Logout => commands::session::logout(&clinic),
        Commands::Status => commands::session::status(&clinic),
        Commands::Open => commands::open::run(&clinic),
        Commands::Calendar {
            date,
            patient,
            doctor,
            list,
            grid,
            json,
        } => {
            let args = commands::calendar::CalendarArgs {
                date,
                patient,
                doctor,
                list,
                grid,
                json,
            };
            commands::calendar::run(&clinic, args)
        }
        Commands::Add {
            patient,
            doctor,
            date,
            time,
        } => commands::add::run(&clinic, patient, doctor, date, time),
        Commands::Edit {
            id,
            patient,
            doctor,
            time,
        } => commands::edit::run(&clinic, &id, patient, doctor, time),
        Commands::Delete { id, force } => commands::delete::run(&clinic, &id, force),
        Commands::Roster => commands::roster::run(&clinic),
    }
}

/// Log to stderr so diagnostics never mix with rendered calendars.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
