//! Pricing engine.
//!
//! One canonical algorithm maps a selection to a total cost:
//!
//! - Package-bound selections cost the package's flat price.
//! - Ad-hoc selections are priced by greedy tiered decomposition: packages
//!   sorted descending by `total_tickets`, whole copies subtracted
//!   greedily, any remainder priced per-ticket at the size-1 package's
//!   price or a configured fallback.
//!
//! The greedy decomposition is deliberately an approximation, not an
//! optimal knapsack: it trades globally minimal price for a rule a buyer
//! can predict. Pricing is deterministic for a given selection and never
//! reads the store.

use crate::error::StorefrontError;
use crate::types::{Money, Package, PromotionHint, Quote, QuoteLine, Selection, SelectionOrigin};

/// Price a selection against a raffle's package list.
///
/// `single_ticket_fallback` prices any remainder when no size-1 package
/// exists.
///
/// # Errors
///
/// Returns [`StorefrontError::Validation`] for an empty selection, or for
/// a package-bound selection whose package code is not in the list or
/// whose count is not the package's `total_tickets`.
pub fn quote(
    selection: &Selection,
    packages: &[Package],
    single_ticket_fallback: Money,
) -> Result<Quote, StorefrontError> {
    if selection.is_empty() {
        return Err(StorefrontError::Validation(
            "cannot price an empty selection".to_string(),
        ));
    }

    match selection.origin() {
        SelectionOrigin::Package { code } => {
            let package = packages.iter().find(|p| &p.code == code).ok_or_else(|| {
                StorefrontError::Validation(format!("unknown package '{code}'"))
            })?;
            // The flat price only covers selections the allocator produced;
            // a package binding over any other count is forged input.
            if selection.count() != package.total_tickets() {
                return Err(StorefrontError::Validation(format!(
                    "package '{code}' covers {} tickets, not {}",
                    package.total_tickets(),
                    selection.count()
                )));
            }
            Ok(Quote {
                total: package.price,
                lines: vec![QuoteLine {
                    package_code: Some(package.code.clone()),
                    units: 1,
                    tickets: package.total_tickets(),
                    amount: package.price,
                }],
            })
        }
        SelectionOrigin::Manual => Ok(decompose(selection.count(), packages, single_ticket_fallback)),
    }
}

/// Greedy tiered decomposition of a raw ticket count.
fn decompose(count: u32, packages: &[Package], single_ticket_fallback: Money) -> Quote {
    let mut tiers: Vec<&Package> = packages.iter().filter(|p| p.total_tickets() >= 1).collect();
    tiers.sort_by(|a, b| b.total_tickets().cmp(&a.total_tickets()));

    let per_ticket = tiers
        .iter()
        .find(|p| p.total_tickets() == 1)
        .map_or(single_ticket_fallback, |p| p.price);

    let mut remaining = count;
    let mut total = Money::from_pesos(0);
    let mut lines = Vec::new();

    for package in tiers {
        let size = package.total_tickets();
        let units = remaining / size;
        if units == 0 {
            continue;
        }
        let amount = package.price.multiply(units);
        total = total.add(amount);
        lines.push(QuoteLine {
            package_code: Some(package.code.clone()),
            units,
            tickets: units * size,
            amount,
        });
        remaining -= units * size;
    }

    if remaining > 0 {
        let amount = per_ticket.multiply(remaining);
        total = total.add(amount);
        lines.push(QuoteLine {
            package_code: None,
            units: remaining,
            tickets: remaining,
            amount,
        });
    }

    Quote { total, lines }
}

/// Compute the "almost qualifies" nudge for an ad-hoc selection.
///
/// Over every package whose `paid_tickets` is at least the current count,
/// the nearest (smallest tickets-needed delta to its `total_tickets`)
/// wins. A package already paying for fewer tickets than the buyer holds
/// is not a step up, so it never hints. No hint once a package is bound,
/// for an empty selection, or when the count already matches some
/// package's `total_tickets`.
#[must_use]
pub fn promotion_hint(selection: &Selection, packages: &[Package]) -> Option<PromotionHint> {
    if selection.is_empty() || matches!(selection.origin(), SelectionOrigin::Package { .. }) {
        return None;
    }

    let count = selection.count();
    if packages.iter().any(|p| p.total_tickets() == count) {
        return None;
    }

    packages
        .iter()
        .filter(|p| p.paid_tickets >= count)
        .min_by_key(|p| p.total_tickets() - count)
        .map(|package| {
            let needed = package.total_tickets() - count;
            PromotionHint {
                package_code: package.code.clone(),
                tickets_needed: needed,
                message: format!(
                    "Add {needed} more ticket{} to get the '{}' package for {}",
                    if needed == 1 { "" } else { "s" },
                    package.code,
                    package.price,
                ),
            }
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{SelectionOrigin, TicketNumber};

    fn packages() -> Vec<Package> {
        vec![
            Package::new("normal".to_string(), Money::from_pesos(150), 1, 0),
            Package::new("5x".to_string(), Money::from_pesos(500), 5, 1),
            Package::new("vip10".to_string(), Money::from_pesos(1000), 10, 0),
        ]
    }

    fn manual(count: u32) -> Selection {
        Selection::from_numbers((1..=count).map(TicketNumber), SelectionOrigin::Manual)
    }

    fn fallback() -> Money {
        Money::from_pesos(150)
    }

    #[test]
    fn package_bound_selection_costs_the_flat_price() {
        let selection = Selection::from_numbers(
            (1..=6).map(TicketNumber),
            SelectionOrigin::Package {
                code: "5x".to_string(),
            },
        );
        let q = quote(&selection, &packages(), fallback()).unwrap();
        assert_eq!(q.total, Money::from_pesos(500));
        assert_eq!(q.lines.len(), 1);
        assert_eq!(q.lines[0].tickets, 6);
    }

    #[test]
    fn ad_hoc_six_decomposes_to_one_5x_unit() {
        // The boundary case: six manual tickets price exactly like the
        // six-slot package.
        let q = quote(&manual(6), &packages(), fallback()).unwrap();
        assert_eq!(q.total, Money::from_pesos(500));
    }

    #[test]
    fn greedy_decomposition_mixes_tiers_and_remainder() {
        // 17 = vip10 (1000) + 5x covering 6 (500) + 1 single (150)
        let q = quote(&manual(17), &packages(), fallback()).unwrap();
        assert_eq!(q.total, Money::from_pesos(1650));
        assert_eq!(q.lines.len(), 3);
    }

    #[test]
    fn remainder_uses_size_one_package_price() {
        // 7 = 5x (500) + 1 single at the "normal" package price
        let q = quote(&manual(7), &packages(), fallback()).unwrap();
        assert_eq!(q.total, Money::from_pesos(650));
    }

    #[test]
    fn remainder_uses_fallback_without_a_size_one_package() {
        let tiers = vec![Package::new("5x".to_string(), Money::from_pesos(500), 5, 1)];
        let q = quote(&manual(8), &tiers, Money::from_pesos(120)).unwrap();
        // 8 = one 5x covering 6 + 2 at the 120-peso fallback
        assert_eq!(q.total, Money::from_pesos(740));
    }

    #[test]
    fn pricing_is_idempotent() {
        let selection = manual(9);
        let first = quote(&selection, &packages(), fallback()).unwrap();
        let second = quote(&selection, &packages(), fallback()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_selection_is_a_validation_error() {
        let err = quote(&Selection::empty(), &packages(), fallback()).unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }

    #[test]
    fn unknown_package_code_is_a_validation_error() {
        let selection = Selection::from_numbers(
            [TicketNumber(1)],
            SelectionOrigin::Package {
                code: "ghost".to_string(),
            },
        );
        let err = quote(&selection, &packages(), fallback()).unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }

    #[test]
    fn package_binding_over_the_wrong_count_is_rejected() {
        // Fifty numbers tagged with the six-slot package must not price at
        // the flat 500.
        let selection = Selection::from_numbers(
            (1..=50).map(TicketNumber),
            SelectionOrigin::Package {
                code: "5x".to_string(),
            },
        );
        let err = quote(&selection, &packages(), fallback()).unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }

    #[test]
    fn hint_names_the_nearest_package() {
        // Five manual tickets: one more reaches the 5x package's six slots.
        let hint = promotion_hint(&manual(5), &packages()).unwrap();
        assert_eq!(hint.package_code, "5x");
        assert_eq!(hint.tickets_needed, 1);
        assert!(hint.message.contains("1 more ticket"));
    }

    #[test]
    fn no_hint_from_a_package_already_outgrown() {
        // Six manual tickets sit between the bundle's paid count (5) and
        // its total (8); the buyer already holds more than it pays for,
        // so it is not a step up.
        let tiers = vec![Package::new("5x3".to_string(), Money::from_pesos(500), 5, 3)];
        assert!(promotion_hint(&manual(6), &tiers).is_none());
    }

    #[test]
    fn hint_clears_at_a_package_boundary() {
        assert!(promotion_hint(&manual(6), &packages()).is_none());
    }

    #[test]
    fn no_hint_for_package_bound_or_empty_selections() {
        let bound = Selection::from_numbers(
            (1..=6).map(TicketNumber),
            SelectionOrigin::Package {
                code: "5x".to_string(),
            },
        );
        assert!(promotion_hint(&bound, &packages()).is_none());
        assert!(promotion_hint(&Selection::empty(), &packages()).is_none());
    }

    #[test]
    fn no_hint_above_the_largest_package() {
        assert!(promotion_hint(&manual(11), &packages()).is_none());
    }
}
