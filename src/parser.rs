//! Stat-block parser
//!
//! A roster is a text file of two-line blocks:
//!
//! ```text
//! Grunts [5] Q4+ D5+ | 100 | Fast
//! 5x Rifle (24, A1), 5x CombatBlade (A1)
//! ```
//!
//! Malformed blocks are skipped with a warning; the engine never sees a
//! partially parsed unit.

use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{char, space0, u32 as parse_u32, u8 as parse_u8};
use nom::combinator::{all_consuming, opt};
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, Parser};
use std::fs;
use std::path::Path;

use crate::core::error::Result;
use crate::unit::{SpecialRule, UnitProfile, WeaponProfile};

/// Largest model count accepted for a unit or a weapon entry
pub const MAX_MODELS: u32 = 1000;
/// Largest `A{n}` accepted per model
pub const MAX_ATTACKS: u32 = 100;
/// Largest `Deadly(n)` multiplier accepted
pub const MAX_DEADLY: u32 = 100;

/// Parse every well-formed unit in a roster
pub fn parse_roster(text: &str) -> Vec<UnitProfile> {
    let mut units = Vec::new();

    for block in blocks(text) {
        for pair in block.chunks(2) {
            let [stat_line, weapon_line] = pair else {
                tracing::warn!(line = pair[0], "stat block missing its weapon line, skipped");
                continue;
            };
            match parse_unit(stat_line, weapon_line) {
                Ok(unit) => units.push(unit),
                Err(reason) => {
                    tracing::warn!(line = *stat_line, %reason, "malformed stat block, skipped")
                }
            }
        }
    }

    units
}

/// Read and parse a roster file
pub fn load_roster(path: &Path) -> Result<Vec<UnitProfile>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_roster(&text))
}

/// Parse one unit from its stat line and weapon line
pub fn parse_unit(stat_line: &str, weapon_line: &str) -> std::result::Result<UnitProfile, String> {
    let mut sections = stat_line.split('|');
    let header = sections.next().unwrap_or_default();

    let (rest, (name, models)) =
        unit_header(header.trim()).map_err(|e| format!("bad unit header: {}", e))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("unit has no name".into());
    }
    let models = at_most(models, MAX_MODELS, "model count")?;

    let mut quality = None;
    let mut defense = None;
    for token in rest.split_whitespace() {
        if let Ok((_, q)) = rating('Q', token) {
            quality = Some(q);
        } else if let Ok((_, d)) = rating('D', token) {
            defense = Some(d);
        }
    }
    let quality = quality.ok_or("missing quality (Q{n}+)")?;
    let defense = defense.ok_or("missing defense (D{n}+)")?;

    let mut unit = UnitProfile::new(name, models, quality, defense);

    if let Some(points) = sections.next() {
        let points = points.trim().trim_end_matches("pts").trim();
        if !points.is_empty() {
            unit.points = Some(
                points
                    .parse()
                    .map_err(|_| format!("bad points value '{}'", points))?,
            );
        }
    }

    if let Some(rules) = sections.next() {
        for token in split_top_level(rules) {
            unit = unit.with_rule(SpecialRule::from_token(token));
        }
    }

    for entry in split_top_level(weapon_line) {
        unit.weapons.push(parse_weapon(entry)?);
    }
    if unit.weapons.is_empty() {
        return Err("no weapons listed".into());
    }

    Ok(unit)
}

/// Parse `{n}x Name (attr, attr, ...)`
pub fn parse_weapon(entry: &str) -> std::result::Result<WeaponProfile, String> {
    let (rest, (models, name)) =
        weapon_header(entry.trim()).map_err(|e| format!("bad weapon '{}': {}", entry, e))?;
    let name = name.trim();
    let models = at_most(models, MAX_MODELS, "weapon model count")?;
    let attrs = rest
        .trim()
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| format!("weapon '{}' has no attribute list", name))?;

    let mut range = 0;
    let mut attacks = None;
    let mut weapon = WeaponProfile::new(name, models, 0, 0);

    for attr in split_top_level(attrs) {
        if let Ok((_, a)) = attacks_attr(attr) {
            attacks = Some(a);
        } else if let Ok((_, ap)) = ap_attr(attr) {
            weapon.ap = ap;
        } else if let Ok((_, n)) = deadly_attr(attr) {
            weapon.deadly = Some(at_most(n, MAX_DEADLY, "Deadly multiplier")?);
        } else if let Ok((_, r)) = range_attr(attr) {
            range = r;
        } else if attr == "Furious" {
            weapon.furious = true;
        } else if attr == "Predator" {
            weapon.predator = true;
        } else {
            tracing::debug!(weapon = name, attr, "ignoring unknown weapon attribute");
        }
    }

    weapon.range = range;
    let attacks = attacks.ok_or_else(|| format!("weapon '{}' has no attacks (A{{n}})", name))?;
    weapon.attacks = at_most(attacks, MAX_ATTACKS, "attacks")?;
    Ok(weapon)
}

fn at_most(value: u32, max: u32, what: &str) -> std::result::Result<u32, String> {
    if value > max {
        Err(format!("{} {} exceeds the limit of {}", what, value, max))
    } else {
        Ok(value)
    }
}

fn unit_header(input: &str) -> IResult<&str, (&str, u32)> {
    (
        take_until("["),
        delimited(char('['), delimited(space0, parse_u32, space0), char(']')),
    )
        .parse(input)
}

fn weapon_header(input: &str) -> IResult<&str, (u32, &str)> {
    (
        terminated(parse_u32, char('x')),
        preceded(space0, take_until("(")),
    )
        .parse(input)
}

fn rating(letter: char, input: &str) -> IResult<&str, u8> {
    all_consuming(delimited(char(letter), parse_u8, char('+'))).parse(input)
}

fn attacks_attr(input: &str) -> IResult<&str, u32> {
    all_consuming(preceded(char('A'), parse_u32)).parse(input)
}

fn ap_attr(input: &str) -> IResult<&str, u8> {
    all_consuming(delimited(tag("AP("), parse_u8, char(')'))).parse(input)
}

fn deadly_attr(input: &str) -> IResult<&str, u32> {
    all_consuming(delimited(tag("Deadly("), parse_u32, char(')'))).parse(input)
}

fn range_attr(input: &str) -> IResult<&str, u32> {
    all_consuming(terminated(parse_u32, opt(char('"')))).parse(input)
}

/// Groups of consecutive non-blank lines
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Split on commas that are not inside parentheses; drops empty pieces
fn split_top_level(input: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&input[start..]);
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
