//! Statistical and property tests for the allocation and pricing engines.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rifa_storefront::allocation::{allocate_package, allocate_quantity};
use rifa_storefront::error::StorefrontError;
use rifa_storefront::pricing::quote;
use rifa_storefront::types::{Money, Package, Selection, SelectionOrigin, TicketNumber};
use rifa_testing::SeededRandom;
use std::collections::{HashMap, HashSet};

fn pool(n: u32) -> Vec<TicketNumber> {
    (1..=n).map(TicketNumber).collect()
}

fn packages() -> Vec<Package> {
    vec![
        Package::new("normal".to_string(), Money::from_pesos(150), 1, 0),
        Package::new("5x".to_string(), Money::from_pesos(500), 5, 1),
        Package::new("vip10".to_string(), Money::from_pesos(1000), 10, 0),
    ]
}

#[test]
fn repeated_draws_are_uniform_over_the_pool() {
    // Chi-square goodness of fit: 2000 draws of 3 from 20 numbers.
    // Expected count per number is 2000 * 3 / 20 = 300; with 19 degrees
    // of freedom the p=0.001 critical value is 43.8.
    let random = SeededRandom::new(42);
    let pool = pool(20);
    let trials = 2000;

    let mut counts: HashMap<TicketNumber, u32> = HashMap::new();
    for _ in 0..trials {
        let selection = allocate_quantity(&pool, 3, &random).unwrap();
        for number in selection.numbers() {
            *counts.entry(number).or_insert(0) += 1;
        }
    }

    let expected = f64::from(trials) * 3.0 / 20.0;
    let chi_square: f64 = pool
        .iter()
        .map(|n| {
            let observed = f64::from(counts.get(n).copied().unwrap_or(0));
            (observed - expected).powi(2) / expected
        })
        .sum();
    assert!(
        chi_square < 43.8,
        "draws look biased: chi-square {chi_square:.1} over 19 df"
    );
}

#[test]
fn a_draw_never_repeats_a_number() {
    let random = SeededRandom::new(7);
    let pool = pool(50);
    for _ in 0..200 {
        let selection = allocate_quantity(&pool, 10, &random).unwrap();
        let numbers = selection.numbers();
        let unique: HashSet<TicketNumber> = numbers.iter().copied().collect();
        assert_eq!(unique.len(), numbers.len());
    }
}

#[test]
fn exhausted_pool_reports_insufficient_inventory() {
    let random = SeededRandom::new(7);
    let pool = pool(4);

    let err = allocate_quantity(&pool, 5, &random).unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::InsufficientInventory {
            requested: 5,
            available: 4
        }
    ));

    // Package draws hit the same check via total_tickets.
    let five_x = Package::new("5x".to_string(), Money::from_pesos(500), 5, 1);
    let err = allocate_package(&pool, &five_x, &random).unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::InsufficientInventory { requested: 6, .. }
    ));
}

proptest! {
    /// The greedy decomposition always accounts for every ticket and is
    /// idempotent for a given selection.
    #[test]
    fn quote_lines_cover_the_selection_exactly(count in 1u32..=200) {
        let selection = Selection::from_numbers(
            (1..=count).map(TicketNumber),
            SelectionOrigin::Manual,
        );
        let fallback = Money::from_pesos(150);

        let first = quote(&selection, &packages(), fallback).unwrap();
        let second = quote(&selection, &packages(), fallback).unwrap();
        prop_assert_eq!(&first, &second);

        let covered: u32 = first.lines.iter().map(|line| line.tickets).sum();
        prop_assert_eq!(covered, count);

        let summed = first
            .lines
            .iter()
            .fold(Money::from_pesos(0), |acc, line| acc.add(line.amount));
        prop_assert_eq!(summed, first.total);
    }

    /// Larger tiers never price worse than buying singles.
    #[test]
    fn tiered_total_never_exceeds_single_ticket_pricing(count in 1u32..=200) {
        let selection = Selection::from_numbers(
            (1..=count).map(TicketNumber),
            SelectionOrigin::Manual,
        );
        let fallback = Money::from_pesos(150);
        let quoted = quote(&selection, &packages(), fallback).unwrap();
        prop_assert!(quoted.total.pesos() <= u64::from(count) * 150);
    }
}
