//! Picking the two combatants out of a parsed roster

use crate::core::error::{Result, SkirmishError};
use crate::unit::UnitProfile;

/// Choose units A and B from `roster`
///
/// Each selector is a 0-based index or a unit name (case-insensitive).
/// Without a selector, A is the first unit and B the second. A roster with
/// fewer than two units is reported as `InsufficientUnits` before any
/// selector is looked at.
pub fn select_pair<'a>(
    roster: &'a [UnitProfile],
    unit_a: Option<&str>,
    unit_b: Option<&str>,
) -> Result<(&'a UnitProfile, &'a UnitProfile)> {
    if roster.len() < 2 {
        return Err(SkirmishError::InsufficientUnits {
            found: roster.len(),
        });
    }

    let a = select_unit(roster, unit_a, 0)?;
    let b = select_unit(roster, unit_b, 1)?;
    tracing::debug!(unit_a = %a.name, unit_b = %b.name, "selected combatants");
    Ok((a, b))
}

fn select_unit<'a>(
    roster: &'a [UnitProfile],
    selector: Option<&str>,
    default_index: usize,
) -> Result<&'a UnitProfile> {
    let Some(selector) = selector else {
        return roster
            .get(default_index)
            .ok_or_else(|| SkirmishError::UnitNotFound(format!("#{}", default_index)));
    };

    if let Ok(index) = selector.parse::<usize>() {
        return roster
            .get(index)
            .ok_or_else(|| SkirmishError::UnitNotFound(format!("#{}", index)));
    }

    roster
        .iter()
        .find(|u| u.name.eq_ignore_ascii_case(selector))
        .ok_or_else(|| SkirmishError::UnitNotFound(selector.to_string()))
}
