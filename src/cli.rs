//! CLI interface for Beacon.
//!
//! One process is one SOS session: the orchestrator is created when a
//! command starts and disposed when it finishes.
//!
//! - `beacon hospitals` — locate and list nearby facilities.
//! - `beacon trigger [TYPE]` — send an SOS and follow it until resolved.
//! - `beacon contacts add|list|remove|promote` — manage emergency contacts.
//!
//! Contact ids take a full UUID or unambiguous prefix.

mod format;

use clap::{Parser, Subcommand};
use tokio::signal;
use uuid::Uuid;

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::device::{DialerLauncher, FixedLocator};
use crate::identity::SignedInUser;
use crate::model::{Contact, DEFAULT_EMERGENCY_TYPE, SosState};
use crate::orchestrator::{Collaborators, Orchestrator};
use crate::storage::Storage;

use format::{format_contact, format_event, format_hospital, format_progress};

/// Beacon — send an SOS and follow it through.
#[derive(Debug, Parser)]
#[command(name = "beacon", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Send on behalf of this user id.
    /// Falls back to `BEACON_USER_ID`, then `user-id` in config, then the guest id.
    #[arg(long = "as", global = true)]
    user: Option<String>,

    /// Latitude to report. Overrides the configured position.
    #[arg(long, global = true, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude to report. Overrides the configured position.
    #[arg(long, global = true, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: getting help
  1. beacon contacts add "Asha" +919800000001
  2. beacon --lat 12.97 --lon 77.59 hospitals
  3. beacon --lat 12.97 --lon 77.59 trigger Medical
     → prints the SOS id, calls Asha, follows the SOS until resolved

Configuration lives in ~/.beacon/config.toml:
  backend-url = "http://localhost:8000"
  latitude = 12.97
  longitude = 77.59"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Locate and list nearby hospitals.
    Hospitals,

    /// Send an SOS.
    ///
    /// Prints the SOS id to stdout, calls the primary contact, and follows
    /// the SOS status on stderr until it is resolved or Ctrl-C is pressed.
    Trigger {
        /// Kind of emergency.
        #[arg(default_value = DEFAULT_EMERGENCY_TYPE)]
        emergency_type: String,

        /// Return once the SOS is sent instead of following its status.
        #[arg(long)]
        no_watch: bool,
    },

    /// Manage emergency contacts. The first contact is the primary.
    Contacts {
        #[command(subcommand)]
        command: ContactsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// Add a contact at the end of the list. Prints the contact id.
    Add {
        /// Display name.
        name: String,
        /// Phone number, e.g. `+919800000001`.
        phone: String,
    },

    /// List contacts, primary first.
    List,

    /// Remove a contact.
    Remove {
        /// Contact id or unambiguous prefix.
        id: String,
    },

    /// Make a contact the primary.
    Promote {
        /// Contact id or unambiguous prefix.
        id: String,
    },
}

/// Run the CLI, returning an error message on failure.
pub async fn run(config: Config, storage: Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Hospitals => {
            let orchestrator = session(&cli, &config, storage);
            cmd_hospitals(&orchestrator).await
        }
        Command::Trigger {
            ref emergency_type,
            no_watch,
        } => {
            let orchestrator = session(&cli, &config, storage);
            cmd_trigger(&orchestrator, emergency_type, !no_watch).await
        }
        Command::Contacts { command } => match command {
            ContactsCommand::Add { name, phone } => cmd_contact_add(&storage, &name, &phone),
            ContactsCommand::List => cmd_contact_list(&storage),
            ContactsCommand::Remove { id } => {
                let contact = resolve_contact(&storage, &id)?;
                storage
                    .remove_contact(contact.id)
                    .map_err(|e| format!("failed to remove contact: {e}"))?;
                eprintln!("Removed {}", contact.name);
                Ok(())
            }
            ContactsCommand::Promote { id } => {
                let contact = resolve_contact(&storage, &id)?;
                storage
                    .promote_contact(contact.id)
                    .map_err(|e| format!("failed to promote contact: {e}"))?;
                eprintln!("{} is now the primary contact", contact.name);
                Ok(())
            }
        },
    }
}

/// Wire up an orchestrator for this process.
fn session(cli: &Cli, config: &Config, storage: Storage) -> Orchestrator {
    let coordinates = cli.lat.zip(cli.lon).or_else(|| config.fixed_position());

    Orchestrator::new(
        Collaborators {
            locator: Box::new(FixedLocator::new(coordinates)),
            backend: Box::new(HttpBackend::new(&config.backend_url)),
            contacts: Box::new(storage),
            launcher: Box::new(DialerLauncher::new(config.dialer.clone())),
            auth: Box::new(SignedInUser::resolve(
                cli.user.as_deref(),
                config.user_id.as_deref(),
            )),
        },
        config.settings(),
    )
}

async fn cmd_hospitals(orchestrator: &Orchestrator) -> Result<(), String> {
    orchestrator.prepare().await;
    let state = orchestrator.state();

    if let Some(message) = state.error_message {
        return Err(format!("could not load hospitals: {message}"));
    }

    if state.hospitals.is_empty() {
        println!("No hospitals nearby");
        return Ok(());
    }
    for hospital in &state.hospitals {
        println!("{}", format_hospital(hospital));
    }
    Ok(())
}

async fn cmd_trigger(
    orchestrator: &Orchestrator,
    emergency_type: &str,
    watch: bool,
) -> Result<(), String> {
    let event = orchestrator
        .trigger(emergency_type)
        .await
        .map_err(|e| format!("SOS not sent: {e}"))?;

    println!("{}", event.id);
    eprintln!("{}", format_event(&event));

    if watch {
        follow(orchestrator, event.id).await;
    }
    // Let the primary contact call go out before the session ends.
    orchestrator.contact_step_done().await;

    orchestrator.dispose();
    Ok(())
}

/// Print progress until the SOS resolves or the user interrupts.
async fn follow(orchestrator: &Orchestrator, id: u64) {
    let mut rx = orchestrator.subscribe();
    let mut last = String::new();

    let interrupted = signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        let line = format_progress(&rx.borrow_and_update());
        if line != last {
            eprintln!("{line}");
            last = line;
        }
        if is_finished(&rx.borrow()) {
            return;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = &mut interrupted => {
                eprintln!("Stopped following SOS #{id}; it stays open with the service");
                return;
            }
        }
    }
}

fn is_finished(state: &SosState) -> bool {
    state.current_event.as_ref().is_some_and(|e| e.is_resolved())
}

fn cmd_contact_add(storage: &Storage, name: &str, phone: &str) -> Result<(), String> {
    let contact = storage
        .add_contact(name, phone)
        .map_err(|e| format!("failed to add contact: {e}"))?;
    println!("{}", contact.id);
    Ok(())
}

fn cmd_contact_list(storage: &Storage) -> Result<(), String> {
    let contacts = storage
        .list_contacts()
        .map_err(|e| format!("failed to list contacts: {e}"))?;

    if contacts.is_empty() {
        println!("No emergency contacts");
        return Ok(());
    }

    for (index, contact) in contacts.iter().enumerate() {
        println!("{}", format_contact(contact, index == 0));
    }
    Ok(())
}

/// Resolve a contact reference (full UUID or unambiguous prefix) to a contact.
fn resolve_contact(storage: &Storage, reference: &str) -> Result<Contact, String> {
    let contacts = storage
        .list_contacts()
        .map_err(|e| format!("failed to list contacts: {e}"))?;

    if let Ok(id) = reference.parse::<Uuid>() {
        return contacts
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| format!("no contact {id}"));
    }

    let matches: Vec<&Contact> = contacts
        .iter()
        .filter(|c| c.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no contact matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let names: Vec<&str> = matches.iter().map(|c| c.name.as_str()).collect();
            Err(format!(
                "'{reference}' is ambiguous, matches {n} contacts: {}",
                names.join(", ")
            ))
        }
    }
}
