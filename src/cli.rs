//! CLI interface for Curbside.
//!
//! One-shot commands read and write the local truck store; `browse` opens an
//! interactive session on top of the same store.
//!
//! Commands that take a truck accept a full id or an unambiguous prefix.

mod browse;
mod format;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::locate;
use crate::model::{Coordinate, Listing, NewTruck, Truck, TruckPatch};
use crate::seed;
use crate::source::{Near, TruckQuery};
use crate::storage::{Storage, StorageError};
use crate::store::{Concern, TruckStore};

use format::{format_detail, format_listing, short_id};

/// Curbside: find food trucks near you.
#[derive(Debug, Parser)]
#[command(name = "curbside", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Getting started:
  1. curbside seed
     → loads five sample trucks around New York City
  2. curbside list --near 40.7192,-73.9969
  3. curbside list --search "korean bbq" --open
  4. curbside show 3f2a

Adding your own:
  curbside add --from truck.json
  curbside update 3f2a --from patch.json

Interactive:
  curbside browse --near 40.7128,-74.0060
  > search taco
  > cuisine Italian,Korean
  > select 3f2a
  > show"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replace every truck with the sample set.
    Seed,

    /// Print how many trucks are stored, active or not.
    Count,

    /// List active trucks, optionally filtered and ranked by distance.
    List(ListArgs),

    /// Show everything about one truck.
    Show {
        /// Truck ID: full id or unambiguous prefix.
        truck: String,

        /// Print the truck as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a truck from a JSON file. Prints the new truck's ID.
    ///
    /// `id` is generated when absent. Timestamps are always set to now.
    Add {
        /// Path to the truck JSON.
        #[arg(long)]
        from: PathBuf,
    },

    /// Update a truck from a JSON file holding only the fields to change.
    Update {
        /// Truck ID: full id or unambiguous prefix.
        truck: String,

        /// Path to the patch JSON.
        #[arg(long)]
        from: PathBuf,
    },

    /// Delete a truck.
    Remove {
        /// Truck ID: full id or unambiguous prefix.
        truck: String,
    },

    /// Browse interactively. Type `help` at the prompt for commands.
    Browse {
        /// Start ranked by distance from this point (`LAT,LNG`).
        #[arg(long, allow_hyphen_values = true)]
        near: Option<Coordinate>,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Words to look for in name, description, cuisine and address.
    #[arg(long)]
    search: Option<String>,

    /// Cuisine tag, exact and case-sensitive. Can be specified multiple times;
    /// `all` disables the filter.
    #[arg(long)]
    cuisine: Vec<String>,

    /// Rank by distance from this point (`LAT,LNG`).
    #[arg(long, allow_hyphen_values = true)]
    near: Option<Coordinate>,

    /// Rank by distance from your location
    /// (`CURBSIDE_LOCATION`, `locate-command` or `location` in config).
    #[arg(long, conflicts_with = "near")]
    locate: bool,

    /// Search radius in meters when ranking by distance.
    #[arg(long)]
    radius: Option<f64>,

    /// Maximum number of trucks.
    #[arg(long)]
    limit: Option<usize>,

    /// Only trucks open right now.
    #[arg(long)]
    open: bool,

    /// Print listings as JSON.
    #[arg(long)]
    json: bool,
}

/// Run the CLI, returning an error message on failure.
pub async fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Seed => cmd_seed(storage),
        Command::Count => cmd_count(storage),
        Command::List(args) => cmd_list(config, storage, &args).await,
        Command::Show { truck, json } => {
            let truck = resolve_truck(storage, &truck)?;
            cmd_show(&truck, json)
        }
        Command::Add { from } => cmd_add(storage, &from),
        Command::Update { truck, from } => {
            let truck = resolve_truck(storage, &truck)?;
            cmd_update(storage, &truck, &from)
        }
        Command::Remove { truck } => {
            let truck = resolve_truck(storage, &truck)?;
            cmd_remove(storage, &truck)
        }
        Command::Browse { near } => browse::run(config, storage, near).await,
    }
}

fn cmd_seed(storage: &Storage) -> Result<(), String> {
    let now = Timestamp::now();
    let trucks: Vec<Truck> = seed::sample_trucks()
        .into_iter()
        .map(|t| t.into_truck(now))
        .collect();

    let count = storage
        .seed(&trucks)
        .map_err(|e| format!("failed to seed trucks: {e}"))?;

    eprintln!("Seeded {count} trucks");
    Ok(())
}

fn cmd_count(storage: &Storage) -> Result<(), String> {
    let count = storage
        .count()
        .map_err(|e| format!("failed to count trucks: {e}"))?;
    println!("{count}");
    Ok(())
}

async fn cmd_list(config: &Config, storage: &Storage, args: &ListArgs) -> Result<(), String> {
    let listings = list_listings(config, storage, args).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&listings)
            .map_err(|e| format!("failed to serialize trucks: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if listings.is_empty() {
        println!("No trucks");
        return Ok(());
    }
    for listing in &listings {
        let open = listing.truck.weekly_hours.is_open_now();
        println!("{}", format_listing(listing, open));
    }
    Ok(())
}

/// Locates if asked, fetches from storage, then narrows by the cuisine
/// selection.
async fn list_listings(
    config: &Config,
    storage: &Storage,
    args: &ListArgs,
) -> Result<Vec<Listing>, String> {
    let mut store = TruckStore::new();

    if args.near.is_some() || args.locate {
        let provider = locate::resolve_provider(args.near, config)
            .map_err(|e| format!("Location error: {e}"))?;
        let timeout = Duration::from_secs(config.locate_timeout_secs);
        store.locate(&*provider, timeout).await;
        if let Some(e) = &store.status(Concern::Location).error {
            return Err(e.clone());
        }
    }

    let query = list_query(config, args, store.observer());
    store.refresh(storage, &query).await;
    if let Some(e) = &store.status(Concern::Trucks).error {
        return Err(e.clone());
    }
    // Word search already ran in storage; only the cuisine selection is
    // refined here.
    store.set_cuisine_selection(args.cuisine.iter().cloned());
    Ok(store.listings().to_vec())
}

/// Storage narrows by a single cuisine only; several are left to the
/// local selection.
fn list_query(config: &Config, args: &ListArgs, observer: Option<Coordinate>) -> TruckQuery {
    let cuisine = match args.cuisine.as_slice() {
        [only] => Some(only.clone()),
        _ => None,
    };
    TruckQuery {
        cuisine,
        search_text: args.search.clone(),
        near: observer.map(|coordinate| Near {
            coordinate,
            radius_meters: args.radius.unwrap_or(config.search_radius),
        }),
        limit: Some(args.limit.unwrap_or(config.limit)),
        open_now: args.open,
    }
}

fn cmd_show(truck: &Truck, json: bool) -> Result<(), String> {
    if json {
        let json = serde_json::to_string_pretty(truck)
            .map_err(|e| format!("failed to serialize truck: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", format_detail(truck, truck.weekly_hours.is_open_now()));
    }
    Ok(())
}

fn cmd_add(storage: &Storage, from: &Path) -> Result<(), String> {
    let new: NewTruck = read_json(from)?;
    let truck = new.into_truck(Timestamp::now());

    storage
        .create_truck(&truck)
        .map_err(|e| format!("failed to add truck: {e}"))?;

    println!("{}", truck.id);
    Ok(())
}

fn cmd_update(storage: &Storage, truck: &Truck, from: &Path) -> Result<(), String> {
    let patch: TruckPatch = read_json(from)?;

    let updated = storage
        .update_truck(&truck.id, &patch)
        .map_err(|e| format!("failed to update truck: {e}"))?;

    eprintln!("Updated {} ({})", updated.name, short_id(&updated.id));
    Ok(())
}

fn cmd_remove(storage: &Storage, truck: &Truck) -> Result<(), String> {
    storage
        .delete_truck(&truck.id)
        .map_err(|e| format!("failed to remove truck: {e}"))?;

    eprintln!("Removed {} ({})", truck.name, short_id(&truck.id));
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&contents).map_err(|e| format!("invalid JSON in {}: {e}", path.display()))
}

/// Resolve a truck reference (full id or unambiguous prefix) to a truck.
fn resolve_truck(storage: &Storage, reference: &str) -> Result<Truck, String> {
    // Try the full id first.
    match storage.load_truck(reference) {
        Ok(truck) => return Ok(truck),
        Err(StorageError::TruckNotFound(_)) => {}
        Err(e) => return Err(format!("failed to load truck: {e}")),
    }

    // Then as a prefix match against all trucks.
    let trucks = storage
        .list_trucks()
        .map_err(|e| format!("failed to list trucks: {e}"))?;
    match_prefix(&trucks, reference).cloned()
}

/// The one truck whose id starts with `reference`.
fn match_prefix<'a>(trucks: &'a [Truck], reference: &str) -> Result<&'a Truck, String> {
    let matches: Vec<&Truck> = trucks
        .iter()
        .filter(|t| t.id.starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no truck matching '{reference}'")),
        [truck] => Ok(*truck),
        _ => {
            let ids: Vec<&str> = matches.iter().map(|t| short_id(&t.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} trucks: {}",
                matches.len(),
                ids.join(", ")
            ))
        }
    }
}
