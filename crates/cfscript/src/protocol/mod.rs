//! Line protocol spoken with the game client over stdio.
//!
//! Outbound lines are built by the helpers in this module and by
//! [`Command::encode`](crate::Command::encode). Inbound lines are classified
//! by [`parse_line`], which only looks at a line's prefix and fields and never
//! at runtime state; routing the result is the job of
//! [`InputRouter`](crate::InputRouter).

use crate::error::ProtocolError;
use crate::item::{Item, ItemFlags};
use crate::player::StatBlock;

/// Enables acknowledgements for ordinary commands. Sent once at startup.
pub const WATCH_COMMANDS: &str = "watch comc";
/// Subscribes to stat pushes.
pub const WATCH_STATS: &str = "watch stats";
/// Cancels stat pushes.
pub const UNWATCH_STATS: &str = "unwatch stats";
/// Asks for the player's tag and title.
pub const REQUEST_PLAYER: &str = "request player";
/// Item request type for the player's inventory.
pub const INVENTORY: &str = "inv";

/// Marker terminating an item listing.
const ITEMS_END: &str = "end";
/// Fields carried by one item line after the request type.
const ITEM_FIELDS: usize = 6;

/// Builds `request <what>`.
#[must_use]
pub fn request_line(what: &str) -> String {
    format!("request {what}")
}

/// Builds `request items <request_type>`.
#[must_use]
pub fn request_items_line(request_type: &str) -> String {
    format!("request items {request_type}")
}

/// Builds `draw <code> <message>`.
#[must_use]
pub fn draw_line(code: u8, message: &str) -> String {
    format!("draw {code} {message}")
}

/// Classification of one inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundLine<'a> {
    /// `watch comc`: one acknowledgeable command resolved.
    Acknowledgement,
    /// `watch stats <name> <value>` for a tracked stat.
    StatUpdate {
        /// Stat name.
        name: &'a str,
        /// New value.
        value: i64,
    },
    /// A `watch` line this runtime does not track.
    Ignored,
    /// `request player <tag> <title>`.
    PlayerIdentity {
        /// Player tag.
        tag: u32,
        /// Title, possibly still carrying a `Player:` label.
        title: &'a str,
    },
    /// `request stat <block> <values...>` with the right arity.
    StatBlock {
        /// Which block was answered.
        block: StatBlock,
        /// Values in wire order.
        values: Vec<i64>,
    },
    /// `request items <type> ...`; decode the rest with [`parse_item_payload`].
    ItemList {
        /// Item request type, such as `inv`.
        request_type: &'a str,
        /// Everything after the request type.
        rest: &'a str,
    },
    /// `scripttell <message>`.
    Scripttell(&'a str),
    /// Anything else.
    Misc(&'a str),
}

/// Body of a `request items` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPayload {
    /// One listed item.
    Entry(Item),
    /// The listing is complete.
    End,
}

/// Classifies one line with its trailing newline already removed.
///
/// Acknowledgements are matched first because they are the most frequent
/// line in a busy script, then `watch` and `request` responses, then chat.
///
/// # Errors
///
/// Returns a [`ProtocolError`] for a `request` or tracked `watch stats`
/// line whose fields do not parse. Callers log and drop such lines.
pub fn parse_line(line: &str) -> Result<InboundLine<'_>, ProtocolError> {
    if line.starts_with(WATCH_COMMANDS) {
        return Ok(InboundLine::Acknowledgement);
    }
    if let Some(rest) = line.strip_prefix("watch ") {
        return parse_watch(rest);
    }
    if let Some(rest) = line.strip_prefix("request ") {
        return parse_request(rest);
    }
    if let Some(rest) = line.strip_prefix("scripttell ") {
        return Ok(InboundLine::Scripttell(rest));
    }
    Ok(InboundLine::Misc(line))
}

fn parse_watch(rest: &str) -> Result<InboundLine<'_>, ProtocolError> {
    let Some(stat) = rest.strip_prefix("stats ") else {
        return Ok(InboundLine::Ignored);
    };
    let (name, value) = stat.split_once(' ').unwrap_or((stat, ""));
    if !crate::player::PlayerInfo::tracks_stat(name) {
        return Ok(InboundLine::Ignored);
    }
    let value = parse_int(&format!("watch stats {name}"), "value", value)?;
    Ok(InboundLine::StatUpdate { name, value })
}

fn parse_request(rest: &str) -> Result<InboundLine<'_>, ProtocolError> {
    if let Some(stat) = rest.strip_prefix("stat ") {
        return parse_stat_block(stat);
    }
    if let Some(items) = rest.strip_prefix("items ") {
        let (request_type, rest) = items.split_once(' ').unwrap_or((items, ""));
        return Ok(InboundLine::ItemList { request_type, rest });
    }
    if let Some(player) = rest.strip_prefix("player ") {
        let (tag, title) = player.split_once(' ').unwrap_or((player, ""));
        let tag = parse_int("request player", "tag", tag)?;
        return Ok(InboundLine::PlayerIdentity { tag, title });
    }
    Err(ProtocolError::UnknownRequest {
        line: rest.to_owned(),
    })
}

fn parse_stat_block(stat: &str) -> Result<InboundLine<'_>, ProtocolError> {
    let (keyword, rest) = stat.split_once(' ').unwrap_or((stat, ""));
    let Some(block) = StatBlock::from_keyword(keyword) else {
        return Err(ProtocolError::UnknownStatBlock {
            line: stat.to_owned(),
        });
    };
    let context = format!("request stat {keyword}");
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let names = block.fields();
    if parts.len() != names.len() {
        return Err(ProtocolError::Arity {
            context,
            expected: names.len(),
            actual: parts.len(),
        });
    }
    let values = names
        .iter()
        .zip(parts)
        .map(|(&name, raw)| parse_int(&context, name, raw))
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(InboundLine::StatBlock { block, values })
}

/// Decodes the body of a `request items <type>` line.
///
/// The name may contain spaces, so only the first five fields are split off
/// and the remainder is kept verbatim.
///
/// # Errors
///
/// Returns [`ProtocolError::Arity`] when fewer than six fields are present
/// and [`ProtocolError::InvalidInteger`] when a numeric field does not parse.
pub fn parse_item_payload(request_type: &str, rest: &str) -> Result<ItemPayload, ProtocolError> {
    if rest == ITEMS_END {
        return Ok(ItemPayload::End);
    }

    let context = format!("request items {request_type}");
    let parts = split_fields(rest, ITEM_FIELDS);
    let [tag, num, weight, flags, client_type, name] = parts.as_slice() else {
        return Err(ProtocolError::Arity {
            context,
            expected: ITEM_FIELDS,
            actual: parts.len(),
        });
    };
    let item = Item::new(
        parse_int(&context, "tag", tag)?,
        parse_int(&context, "num", num)?,
        parse_int(&context, "weight", weight)?,
        ItemFlags::from_bits_retain(parse_int(&context, "flags", flags)?),
        parse_int(&context, "client_type", client_type)?,
        *name,
    );
    Ok(ItemPayload::Entry(item))
}

/// Splits off at most `max - 1` whitespace-delimited fields; the final field
/// is the untouched remainder.
fn split_fields(text: &str, max: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(max);
    let mut remainder = text.trim_start();
    while !remainder.is_empty() {
        if fields.len() + 1 == max {
            fields.push(remainder);
            break;
        }
        match remainder.split_once(char::is_whitespace) {
            Some((field, rest)) => {
                fields.push(field);
                remainder = rest.trim_start();
            }
            None => {
                fields.push(remainder);
                break;
            }
        }
    }
    fields
}

fn parse_int<T: std::str::FromStr>(
    context: &str,
    field: &'static str,
    raw: &str,
) -> Result<T, ProtocolError> {
    raw.trim().parse().map_err(|_| ProtocolError::InvalidInteger {
        context: context.to_owned(),
        field,
        value: raw.to_owned(),
    })
}
