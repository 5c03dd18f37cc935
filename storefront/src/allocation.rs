//! Ticket allocation engine.
//!
//! Turns a requested quantity or package selection into a concrete set of
//! ticket numbers. Random draws go through [`RandomSource`], whose contract
//! is uniform subset sampling - every size-N subset of the available pool
//! is equally likely, not merely every permutation of a biased shuffle.
//! Allocation never touches the store; the availability pool it is handed
//! is advisory and the reservation commit re-checks.

use crate::error::StorefrontError;
use crate::store::TicketSet;
use crate::types::{Package, Selection, SelectionOrigin, TicketNumber};
use rifa_core::environment::RandomSource;

/// Draw exactly `quantity` distinct numbers uniformly from the available
/// pool.
///
/// The returned selection is ad-hoc (priced by decomposition). Numbers come
/// back sorted ascending - a presentation convention, not a correctness
/// requirement.
///
/// # Errors
///
/// Returns [`StorefrontError::InsufficientInventory`] when `quantity`
/// exceeds the pool; no store interaction happens on failure.
pub fn allocate_quantity(
    available: &[TicketNumber],
    quantity: u32,
    random: &dyn RandomSource,
) -> Result<Selection, StorefrontError> {
    let numbers = draw(available, quantity, random)?;
    Ok(Selection::from_numbers(numbers, SelectionOrigin::Manual))
}

/// Draw a package's full ticket count, binding the selection to the package
/// for flat pricing.
///
/// # Errors
///
/// Returns [`StorefrontError::InsufficientInventory`] when the package's
/// `total_tickets` exceeds the pool.
pub fn allocate_package(
    available: &[TicketNumber],
    package: &Package,
    random: &dyn RandomSource,
) -> Result<Selection, StorefrontError> {
    let numbers = draw(available, package.total_tickets(), random)?;
    Ok(Selection::from_numbers(
        numbers,
        SelectionOrigin::Package {
            code: package.code.clone(),
        },
    ))
}

/// Add or remove one number from a selection by hand.
///
/// Removing always succeeds; adding requires the number to be absent from
/// the ticket snapshot and inside the number space. Either way the
/// selection reverts to ad-hoc - a manual touch clears any package binding.
///
/// # Errors
///
/// Returns [`StorefrontError::Validation`] when adding a number that is
/// out of range or already taken.
pub fn toggle_number(
    selection: &Selection,
    number: TicketNumber,
    tickets: &TicketSet,
    total_tickets: u32,
) -> Result<Selection, StorefrontError> {
    if selection.contains(number) {
        return Ok(selection.without(number));
    }
    if number.0 < 1 || number.0 > total_tickets {
        return Err(StorefrontError::Validation(format!(
            "ticket number {number} is outside the range 1..={total_tickets}"
        )));
    }
    if tickets.contains_key(&number) {
        return Err(StorefrontError::Validation(format!(
            "ticket number {number} is no longer available"
        )));
    }
    Ok(selection.with(number))
}

/// Uniform draw of `quantity` distinct numbers from the pool.
#[allow(clippy::cast_possible_truncation)] // pool size is bounded by the u32 number space
fn draw(
    available: &[TicketNumber],
    quantity: u32,
    random: &dyn RandomSource,
) -> Result<Vec<TicketNumber>, StorefrontError> {
    let pool = available.len() as u32;
    if quantity > pool {
        return Err(StorefrontError::InsufficientInventory {
            requested: quantity,
            available: pool,
        });
    }

    let mut numbers: Vec<TicketNumber> = random
        .sample_indices(available.len(), quantity as usize)
        .into_iter()
        .map(|i| available[i])
        .collect();
    numbers.sort_unstable();
    Ok(numbers)
}
