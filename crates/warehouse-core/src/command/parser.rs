//! Tokenizer turning one line of text into a [`Command`].

use super::Command;
use crate::chemistry::{AtomKind, DrinkKind, MoleculeKind};
use crate::config::ProtocolConfig;
use crate::error::{Result, WarehouseError};

/// Parse one command line.
///
/// Keywords and names are case-sensitive; tokens are separated by any run of
/// whitespace and surrounding whitespace (including a trailing newline) is
/// ignored. Unknown names produce the matching `Unknown*` error, anything
/// else malformed produces [`WarehouseError::Parse`].
pub fn parse(line: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&keyword, args)) = tokens.split_first() else {
        return Err(WarehouseError::parse("empty command"));
    };

    match keyword {
        "ADD" => parse_add(args),
        "DELIVER" => parse_deliver(args),
        "GEN" => parse_gen(args),
        other => Err(WarehouseError::parse(format!("unknown keyword `{other}`"))),
    }
}

fn parse_add(args: &[&str]) -> Result<Command> {
    let [kind, amount] = args else {
        return Err(WarehouseError::parse("ADD expects <ATOM> <amount>"));
    };
    let atom: AtomKind = kind.parse()?;
    let amount = parse_count(amount)
        .ok_or_else(|| WarehouseError::parse(format!("invalid amount `{amount}`")))?;
    Ok(Command::Add { atom, amount })
}

fn parse_deliver(args: &[&str]) -> Result<Command> {
    if args.is_empty() {
        return Err(WarehouseError::parse("DELIVER expects a molecule name"));
    }

    // A purely numeric last token is the count, but only when something is
    // left over to be the name. A molecule whose name ended in a number
    // would be misread here.
    let (name_tokens, count) = match args.split_last() {
        Some((last, rest)) if !rest.is_empty() && is_digits(last) => {
            let count = parse_count(last)
                .filter(|&count| count <= ProtocolConfig::MAX_DELIVER_COUNT)
                .ok_or_else(|| WarehouseError::parse(format!("count out of range `{last}`")))?;
            (rest, count)
        }
        _ => (args, ProtocolConfig::DEFAULT_DELIVER_COUNT),
    };

    let molecule: MoleculeKind = name_tokens.join(" ").parse()?;
    Ok(Command::Deliver { molecule, count })
}

fn parse_gen(args: &[&str]) -> Result<Command> {
    if args.is_empty() {
        return Err(WarehouseError::parse("GEN expects a product name"));
    }
    let drink: DrinkKind = args.join(" ").parse()?;
    Ok(Command::Gen { drink })
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn parse_count(token: &str) -> Option<u64> {
    if !is_digits(token) {
        return None;
    }
    token.parse().ok()
}
