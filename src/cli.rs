use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use geomark_app::prelude as flows;
use geomark_core::{
    entities::{Id, MapPoint, Timestamp},
    usecases,
};
use geomark_db_sqlite::{run_embedded_database_migrations, Connections};

use crate::{config::Config, gateways, report};

#[derive(Debug, Parser)]
#[command(name = "geomark", version, about = "Tag where you are")]
struct Args {
    /// Configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Acquire the current position, resolve its address and tag it
    Capture {
        /// Free-text annotation
        #[arg(long, default_value = "")]
        description: String,
        /// One of the fixed category labels
        #[arg(long, default_value = "No Category")]
        category: String,
        /// Print the fix without saving a record
        #[arg(long)]
        dry_run: bool,
    },
    /// List all tagged locations, newest first
    List,
    /// Show a single tagged location
    Show { id: String },
    /// Overwrite fields of a tagged location and resave it
    Edit {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// New coordinate as "lat,lng" degrees
        #[arg(long)]
        position: Option<String>,
        /// Drop the stored address snapshot
        #[arg(long)]
        clear_address: bool,
    },
    /// Delete a tagged location
    Delete { id: String },
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let cfg = Config::try_load_from_file_or_default(args.config.as_deref())?;

    log::info!(
        "Connecting to SQLite database '{}' (pool size = {})",
        cfg.db.conn_sqlite,
        cfg.db.conn_pool_size
    );
    let connections = Connections::init(&cfg.db.conn_sqlite, cfg.db.conn_pool_size.into())?;
    run_embedded_database_migrations(connections.exclusive()?);

    match args.command {
        Command::Capture {
            description,
            category,
            dry_run,
        } => capture(&cfg, &connections, description, category, dry_run),
        Command::List => list(&connections),
        Command::Show { id } => show(&connections, &id),
        Command::Edit {
            id,
            description,
            category,
            position,
            clear_address,
        } => edit(&connections, &id, description, category, position, clear_address),
        Command::Delete { id } => delete(&connections, &id),
    }
}

fn capture(
    cfg: &Config,
    connections: &Connections,
    description: String,
    category: String,
    dry_run: bool,
) -> Result<()> {
    let mut source = gateways::location_source(cfg)?;
    let permission = gateways::permission_gateway(cfg);
    let geocoder = gateways::geocoding_gateway(cfg);

    println!("Searching...");
    let fix = match flows::acquire_fix(&mut source, &permission, geocoder, cfg.acquisition.clone())
    {
        Ok(fix) => fix,
        Err(err) => {
            println!("{}", report::error_status(&err));
            return Err(err.into());
        }
    };
    println!("{}", report::fix_report(&fix));

    if dry_run {
        return Ok(());
    }

    let (lat, lng) = fix.reading.pos.to_lat_lng_deg();
    let new_location = usecases::NewTaggedLocation {
        lat,
        lng,
        description,
        category,
        address: fix.address().cloned(),
    };
    let location = flows::tag_location(connections, new_location, Timestamp::now())?;
    println!("Tagged");
    println!("{}", report::location_summary(&location));
    Ok(())
}

fn list(connections: &Connections) -> Result<()> {
    let db = connections.shared()?;
    let locations = usecases::load_tagged_locations(&db)?;
    if locations.is_empty() {
        println!("No tagged locations yet. Run `geomark capture` to add one.");
        return Ok(());
    }
    for location in &locations {
        println!("{}", report::location_summary(location));
    }
    Ok(())
}

fn show(connections: &Connections, id: &str) -> Result<()> {
    let db = connections.shared()?;
    let location = usecases::get_tagged_location(&db, &Id::from(id))?;
    println!("{}", report::location_details(&location));
    Ok(())
}

fn edit(
    connections: &Connections,
    id: &str,
    description: Option<String>,
    category: Option<String>,
    position: Option<String>,
    clear_address: bool,
) -> Result<()> {
    let pos = position
        .map(|pos| pos.parse::<MapPoint>())
        .transpose()?
        .map(MapPoint::to_lat_lng_deg);
    let edit = flows::EditTaggedLocation {
        description,
        category,
        pos,
        clear_address,
    };
    let location = flows::update_location(connections, Id::from(id), edit)?;
    println!("Updated");
    println!("{}", report::location_details(&location));
    Ok(())
}

fn delete(connections: &Connections, id: &str) -> Result<()> {
    let db = connections.exclusive()?;
    usecases::delete_tagged_location(&db, &Id::from(id))?;
    println!("Deleted {id}");
    Ok(())
}
