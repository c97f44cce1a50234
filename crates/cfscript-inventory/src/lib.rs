//! Inventory listing script.
//!
//! Requests the player's inventory once, waits for the complete listing and
//! draws one line per item, sorted by client type. Locked items are prefixed
//! with `*`, status flags are appended in parentheses and stacks show their
//! size. Applied items are drawn in black, everything else in navy.

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use cfscript::telemetry::{self, TelemetryError};
use cfscript::{ClientError, ClientInterface, Color, Item, LineSink, LineSource};
use cfscript_config::Config;
use thiserror::Error;
use tracing::{error, info};

/// Tracing target for the script.
const INVENTORY_TARGET: &str = "cfscript::inventory";

/// Failures that stop the script before or while listing.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Configuration could not be loaded.
    #[error("failed to load configuration: {0}")]
    Configuration(Arc<ortho_config::OrthoError>),
    /// Telemetry could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The client interface failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Loads configuration from `args`, connects over stdio and draws the
/// inventory.
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match try_run(args) {
        Ok(count) => {
            info!(target: INVENTORY_TARGET, count, "inventory drawn");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!(target: INVENTORY_TARGET, %failure, "inventory script failed");
            ExitCode::FAILURE
        }
    }
}

fn try_run<I, T>(args: I) -> Result<usize, InventoryError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config = Config::load_from_iter(args).map_err(InventoryError::Configuration)?;
    let _telemetry = telemetry::initialise(&config)?;
    let mut client = ClientInterface::connect(&config)?;
    Ok(print_inventory(&mut client)?)
}

/// Fetches the inventory and draws it. Returns the number of items drawn.
///
/// # Errors
///
/// Returns a [`ClientError`] if the listing cannot be fetched.
pub fn print_inventory<R, W>(client: &mut ClientInterface<R, W>) -> Result<usize, ClientError>
where
    R: LineSource,
    W: LineSink,
{
    let mut items = client.get_inventory()?;
    // The client usually sorts by type already.
    items.sort_by_key(Item::client_type);
    for item in &items {
        let (line, color) = describe_item(item);
        client.draw(&line, color);
    }
    Ok(items.len())
}

/// Text and colour used to draw `item`.
#[must_use]
pub fn describe_item(item: &Item) -> (String, Color) {
    let mut line = if item.locked() {
        format!("* {}", item.name())
    } else {
        item.name().to_owned()
    };
    if item.magical() {
        line.push_str(" (magic)");
    }
    if item.damned() {
        line.push_str(" (damned)");
    } else if item.cursed() {
        line.push_str(" (cursed)");
    }
    if item.unpaid() {
        line.push_str(" (unpaid)");
    }
    if item.applied() {
        line.push_str(" (applied)");
    }
    if item.open() {
        line.push_str(" (open)");
    }
    if item.num() != 1 {
        line.push_str(&format!(" <stack of {}>", item.num()));
    }
    let color = if item.applied() {
        Color::Black
    } else {
        Color::Navy
    };
    (line, color)
}
