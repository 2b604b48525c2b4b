use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info};

use tekhne_pdf::{FsImageSource, ReportRenderer};
use tekhne_store_db::{
    ActionType, InsertStepParams, OpenMode, ReportDb, Role, Session,
};

use crate::config::Config;
use crate::error::{CliError, IoContext};

mod config;
mod error;

#[derive(Parser)]
#[command(name = "tekhne")]
#[command(about = "Maintenance procedure logging and report export")]
#[command(version)]
struct Cli {
    /// Account username
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Account password (hashed before it reaches the store)
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List logged steps visible to the account
    List,

    /// List user accounts and their workshops
    Users,

    /// Log one procedure step
    Log {
        /// Component display name
        #[arg(long)]
        component_name: String,

        /// Inventory code identifying the component
        #[arg(long)]
        inventory_code: String,

        /// Procedure classification (Assemble or Disassemble)
        #[arg(long)]
        action: ActionType,

        /// Step number; defaults to the next free number
        #[arg(long)]
        step_number: Option<u32>,

        /// What was done in this step
        #[arg(long)]
        description: Option<String>,

        /// Photo reference (path or URI)
        #[arg(long)]
        photo: Option<String>,
    },

    /// Export a report as a PDF document
    Export {
        /// Id of any step belonging to the report
        #[arg(long)]
        step_id: i64,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let mut db = ReportDb::open(&config.db_path, OpenMode::Create)?;
    let session = login(&db, cli.username.as_deref(), cli.password.as_deref())?;
    info!("Logged in as {} ({})", session.display_name, session.role);

    match cli.command {
        Commands::List => cmd_list(&db, &session),
        Commands::Users => cmd_users(&db, &session),
        Commands::Log {
            component_name,
            inventory_code,
            action,
            step_number,
            description,
            photo,
        } => cmd_log(
            &mut db,
            &session,
            &component_name,
            &inventory_code,
            action,
            step_number,
            description,
            photo,
        ),
        Commands::Export { step_id } => cmd_export(&db, &session, &config, step_id),
    }
}

/// Hash the typed password and check the pair against the store.
///
/// The store compares pre-hashed values; the digest here is the plain MD5
/// contract the seeded demo accounts use.
fn login(
    db: &ReportDb,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<Session, CliError> {
    let (Some(username), Some(password)) = (username, password) else {
        return Err(CliError::usage("--username and --password are required"));
    };
    let digest = md5::compute(password.trim().as_bytes());
    Ok(db.authenticate(username.trim(), &format!("{digest:x}"))?)
}

fn cmd_list(db: &ReportDb, session: &Session) -> Result<(), CliError> {
    let summaries = db.list_reports(session)?;
    if summaries.is_empty() {
        println!("No reports logged yet.");
        return Ok(());
    }
    for summary in &summaries {
        println!(
            "#{}\t{} ({})\t{}\t{} ({})\t{}",
            summary.step_id,
            summary.component_name,
            summary.inventory_code,
            summary.action_type,
            summary.technician_name,
            summary.workshop_name,
            summary.logged_at,
        );
    }
    Ok(())
}

fn cmd_users(db: &ReportDb, session: &Session) -> Result<(), CliError> {
    if session.role != Role::Admin {
        return Err(CliError::usage("only administrators can list users"));
    }
    for user in db.list_users()? {
        let workshop = user.workshop_name.as_deref().unwrap_or("-");
        println!("{}\t{}\t{}", user.display_name, user.role, workshop);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_log(
    db: &mut ReportDb,
    session: &Session,
    component_name: &str,
    inventory_code: &str,
    action: ActionType,
    step_number: Option<u32>,
    description: Option<String>,
    photo: Option<String>,
) -> Result<(), CliError> {
    let workshop_id = session.workshop_id.ok_or_else(|| {
        CliError::usage("the account has no workshop assignment; steps cannot be logged")
    })?;

    let component_id = db.resolve_component(component_name, inventory_code, workshop_id)?;
    let step_number = match step_number {
        Some(number) => number,
        None => db.next_step_number(component_id)?,
    };

    let step_id = db.insert_step(&InsertStepParams {
        component_id,
        user_id: session.user_id,
        action_type: action,
        step_number,
        description,
        photo_ref: photo,
    })?;

    info!("Logged step {step_number} (id {step_id}) for component {inventory_code}");
    println!("{step_id}");
    Ok(())
}

fn cmd_export(
    db: &ReportDb,
    session: &Session,
    config: &Config,
    step_id: i64,
) -> Result<(), CliError> {
    let report = db.derive_report(step_id)?;

    let source = match &config.photo_dir {
        Some(dir) => FsImageSource::with_base_dir(dir),
        None => FsImageSource::new(),
    };
    let renderer = ReportRenderer::new(&source);

    std::fs::create_dir_all(&config.output_dir).io_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    let path = renderer.render_to_file(&report.header, &report.steps, &config.output_dir)?;

    info!(
        "Exported report for '{}' requested by {}",
        report.header.inventory_code, session.display_name
    );
    println!("{}", path.display());
    Ok(())
}
