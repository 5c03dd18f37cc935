//! Domain types for the raffle storefront.
//!
//! This module contains all value objects and entities: raffles with their
//! package lists, numbered tickets, buyer contact info, and the ephemeral
//! `Selection` a buyer builds before committing a reservation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a raffle
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RaffleId(Uuid);

impl RaffleId {
    /// Creates a new random `RaffleId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RaffleId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RaffleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RaffleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ticket number within a raffle's number space `[1, total_tickets]`.
///
/// The number IS the ticket's identity; no separate key exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketNumber(pub u32);

impl TicketNumber {
    /// Creates a new `TicketNumber`
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Self(number)
    }

    /// Returns the raw number
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (whole pesos; the gateway charges centavos)
// ============================================================================

/// Represents money in whole pesos (MXN).
///
/// Prices in this domain are whole-peso amounts; the payment gateway is the
/// only consumer that needs sub-unit granularity, via [`Money::centavos`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from whole pesos
    #[must_use]
    pub const fn from_pesos(pesos: u64) -> Self {
        Self(pesos)
    }

    /// Returns the amount in whole pesos
    #[must_use]
    pub const fn pesos(&self) -> u64 {
        self.0
    }

    /// Returns the amount in centavos (pesos x 100) for gateway unit amounts
    ///
    /// # Panics
    ///
    /// Panics if the conversion would overflow (pesos * 100 > `u64::MAX`).
    /// Use `checked_centavos` for non-panicking conversion.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn centavos(&self) -> u64 {
        match self.0.checked_mul(100) {
            Some(centavos) => centavos,
            None => panic!("Money::centavos overflow"),
        }
    }

    /// Returns the amount in centavos with overflow checking
    #[must_use]
    pub const fn checked_centavos(&self) -> Option<u64> {
        self.0.checked_mul(100)
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts
    ///
    /// # Panics
    ///
    /// Panics if the addition would overflow.
    /// Use `checked_add` for non-panicking addition.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn add(self, other: Self) -> Self {
        match self.checked_add(other) {
            Some(result) => result,
            None => panic!("Money::add overflow"),
        }
    }

    /// Multiplies money by a quantity with overflow checking
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity
    ///
    /// # Panics
    ///
    /// Panics if the multiplication would overflow.
    /// Use `checked_multiply` for non-panicking multiplication.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn multiply(self, quantity: u32) -> Self {
        match self.checked_multiply(quantity) {
            Some(result) => result,
            None => panic!("Money::multiply overflow"),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} MXN", self.0)
    }
}

// ============================================================================
// Packages
// ============================================================================

/// A purchasable ticket bundle within a raffle.
///
/// The buyer pays for `paid_tickets` and receives
/// `paid_tickets + free_tickets` slots. `total_tickets()` values must be
/// distinct across a raffle's package list (validated at raffle creation)
/// because pricing looks packages up by that value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Unique label within the raffle (e.g., "normal", "5x", "vip10")
    pub code: String,
    /// Flat price for the whole bundle
    pub price: Money,
    /// Tickets the buyer pays for (>= 1)
    pub paid_tickets: u32,
    /// Bonus tickets granted on top (>= 0)
    pub free_tickets: u32,
}

impl Package {
    /// Creates a new `Package`
    #[must_use]
    pub const fn new(code: String, price: Money, paid_tickets: u32, free_tickets: u32) -> Self {
        Self {
            code,
            price,
            paid_tickets,
            free_tickets,
        }
    }

    /// Number of ticket slots the buyer actually receives
    #[must_use]
    pub const fn total_tickets(&self) -> u32 {
        self.paid_tickets + self.free_tickets
    }
}

// ============================================================================
// Raffle
// ============================================================================

/// One sweepstake instance with its own number space and package list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raffle {
    /// Unique raffle identifier
    pub id: RaffleId,
    /// Prize / product name shown to buyers
    pub product_name: String,
    /// Storefront title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Prize image URL
    pub image_url: Option<String>,
    /// Size of the number space `[1, total_tickets]`
    pub total_tickets: u32,
    /// At most one raffle is active at any time across the store
    pub is_active: bool,
    /// Purchasable bundles, ordered as configured
    pub packages: Vec<Package>,
    /// When the raffle was created
    pub created_at: DateTime<Utc>,
}

impl Raffle {
    /// Checks whether a number falls inside this raffle's number space
    #[must_use]
    pub const fn contains(&self, number: TicketNumber) -> bool {
        number.0 >= 1 && number.0 <= self.total_tickets
    }

    /// Look up a package by its code
    #[must_use]
    pub fn package(&self, code: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.code == code)
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Persisted ticket status. A number with no record at all is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Reserved via bank transfer, awaiting payment confirmation
    Pending,
    /// Payment confirmed; terminal
    Sold,
}

/// Buyer contact info attached to a ticket or reservation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    /// Buyer's display name
    pub name: String,
    /// Buyer's email, used as the key for per-buyer admin operations
    pub email: String,
}

impl BuyerInfo {
    /// Creates a new `BuyerInfo`
    #[must_use]
    pub const fn new(name: String, email: String) -> Self {
        Self { name, email }
    }

    /// Validate the contact fields before any store interaction.
    ///
    /// # Errors
    ///
    /// Returns a description of the first failing field: empty name, empty
    /// email, or an email without the `local@domain` shape.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("buyer name must not be empty".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("buyer email must not be empty".to_string());
        }
        let (local, domain) = self.email.split_once('@').unwrap_or(("", ""));
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(format!("buyer email '{}' is not valid", self.email));
        }
        Ok(())
    }
}

/// One numbered slot within a raffle.
///
/// Lifecycle: absent -> `Pending` (buyer reserves) -> `Sold` (admin confirms
/// or the payment webhook fires), with an admin-triggered escape
/// `Pending` -> absent (cancel). No transition returns from `Sold`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket number - the identity within the raffle
    pub number: TicketNumber,
    /// Current status
    pub status: TicketStatus,
    /// Who holds this ticket
    pub buyer: BuyerInfo,
    /// Set when the ticket became `Pending` (judges the 24-hour hold)
    pub reserved_at: Option<DateTime<Utc>>,
    /// Set when the ticket became `Sold`
    pub purchased_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Creates a pending ticket from a reservation
    #[must_use]
    pub const fn pending(number: TicketNumber, buyer: BuyerInfo, now: DateTime<Utc>) -> Self {
        Self {
            number,
            status: TicketStatus::Pending,
            buyer,
            reserved_at: Some(now),
            purchased_at: None,
        }
    }

    /// Creates a sold ticket from a confirmed payment
    #[must_use]
    pub const fn sold(number: TicketNumber, buyer: BuyerInfo, now: DateTime<Utc>) -> Self {
        Self {
            number,
            status: TicketStatus::Sold,
            buyer,
            reserved_at: None,
            purchased_at: Some(now),
        }
    }

    /// Whether the 24-hour hold on a pending ticket has lapsed.
    ///
    /// Expiry is judged, not enforced: nothing releases the ticket
    /// automatically, an administrator cancels it.
    #[must_use]
    pub fn hold_expired(&self, now: DateTime<Utc>, hold: chrono::Duration) -> bool {
        match (self.status, self.reserved_at) {
            (TicketStatus::Pending, Some(reserved_at)) => now - reserved_at >= hold,
            _ => false,
        }
    }
}

// ============================================================================
// Selection (ephemeral, session-local)
// ============================================================================

/// How the current selection came to be; drives pricing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionOrigin {
    /// Numbers drawn for a specific package; priced flat at the package price
    Package {
        /// Code of the package that produced the allocation
        code: String,
    },
    /// Ad-hoc manual picks or a raw quantity request; priced by decomposition
    Manual,
}

/// The set of numbers a buyer is currently considering.
///
/// An immutable value: every operation returns a new `Selection` rather
/// than mutating in place, so allocation, manual toggling, and pricing
/// cannot observe each other's partial updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    numbers: BTreeSet<TicketNumber>,
    origin: SelectionOrigin,
}

impl Selection {
    /// Creates an empty ad-hoc selection
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            numbers: BTreeSet::new(),
            origin: SelectionOrigin::Manual,
        }
    }

    /// Creates a selection from already-chosen numbers
    #[must_use]
    pub fn from_numbers(
        numbers: impl IntoIterator<Item = TicketNumber>,
        origin: SelectionOrigin,
    ) -> Self {
        Self {
            numbers: numbers.into_iter().collect(),
            origin,
        }
    }

    /// How this selection came to be
    #[must_use]
    pub const fn origin(&self) -> &SelectionOrigin {
        &self.origin
    }

    /// Number of selected tickets
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // bounded by the raffle's u32 number space
    pub fn count(&self) -> u32 {
        self.numbers.len() as u32
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Whether a specific number is selected
    #[must_use]
    pub fn contains(&self, number: TicketNumber) -> bool {
        self.numbers.contains(&number)
    }

    /// Selected numbers in ascending order
    #[must_use]
    pub fn numbers(&self) -> Vec<TicketNumber> {
        self.numbers.iter().copied().collect()
    }

    /// Returns a new selection with `number` removed, reverting to ad-hoc.
    ///
    /// Used by the toggle path; adding goes through availability checks in
    /// the allocation engine.
    #[must_use]
    pub fn without(&self, number: TicketNumber) -> Self {
        let mut numbers = self.numbers.clone();
        numbers.remove(&number);
        Self {
            numbers,
            origin: SelectionOrigin::Manual,
        }
    }

    /// Returns a new selection with `number` added, reverting to ad-hoc.
    ///
    /// Callers must have verified availability; see
    /// [`crate::allocation::toggle_number`].
    #[must_use]
    pub fn with(&self, number: TicketNumber) -> Self {
        let mut numbers = self.numbers.clone();
        numbers.insert(number);
        Self {
            numbers,
            origin: SelectionOrigin::Manual,
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Pricing results
// ============================================================================

/// One line of a quote: how many copies of which package (or loose tickets).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    /// Package code, or `None` for loose per-ticket remainder
    pub package_code: Option<String>,
    /// How many copies of the package (or loose tickets)
    pub units: u32,
    /// Ticket slots covered by this line
    pub tickets: u32,
    /// Line amount
    pub amount: Money,
}

/// Total cost for a selection, with its decomposition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Total cost
    pub total: Money,
    /// How the total was assembled
    pub lines: Vec<QuoteLine>,
}

/// A nudge telling the buyer how close they are to a better package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionHint {
    /// Package the buyer is closest to
    pub package_code: String,
    /// Additional tickets needed to reach that package's total
    pub tickets_needed: u32,
    /// Human-readable nudge
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_total_tickets_sums_paid_and_free() {
        let package = Package::new("5x".to_string(), Money::from_pesos(500), 5, 1);
        assert_eq!(package.total_tickets(), 6);
    }

    #[test]
    fn money_centavos_is_pesos_times_hundred() {
        assert_eq!(Money::from_pesos(150).centavos(), 15_000);
        assert_eq!(Money::from_pesos(0).centavos(), 0);
    }

    #[test]
    fn buyer_info_validation() {
        assert!(BuyerInfo::new("Ana".into(), "ana@example.com".into())
            .validate()
            .is_ok());
        assert!(BuyerInfo::new(String::new(), "ana@example.com".into())
            .validate()
            .is_err());
        assert!(BuyerInfo::new("Ana".into(), "not-an-email".into())
            .validate()
            .is_err());
        assert!(BuyerInfo::new("Ana".into(), "ana@localhost".into())
            .validate()
            .is_err());
    }

    #[test]
    fn selection_operations_return_new_values() {
        let empty = Selection::empty();
        let with_seven = empty.with(TicketNumber(7));

        assert!(empty.is_empty());
        assert!(with_seven.contains(TicketNumber(7)));
        assert_eq!(with_seven.count(), 1);

        let back = with_seven.without(TicketNumber(7));
        assert!(back.is_empty());
    }

    #[test]
    fn toggling_a_package_selection_reverts_to_manual() {
        let selection = Selection::from_numbers(
            [TicketNumber(1), TicketNumber(2)],
            SelectionOrigin::Package {
                code: "5x".to_string(),
            },
        );
        let toggled = selection.with(TicketNumber(3));
        assert_eq!(*toggled.origin(), SelectionOrigin::Manual);
    }

    #[test]
    fn selection_numbers_are_sorted_ascending() {
        let selection = Selection::from_numbers(
            [TicketNumber(9), TicketNumber(3), TicketNumber(7)],
            SelectionOrigin::Manual,
        );
        assert_eq!(
            selection.numbers(),
            vec![TicketNumber(3), TicketNumber(7), TicketNumber(9)]
        );
    }

    #[test]
    fn hold_expiry_is_judged_from_reserved_at() {
        let reserved_at = Utc::now();
        let ticket = Ticket::pending(
            TicketNumber(1),
            BuyerInfo::new("Ana".into(), "ana@example.com".into()),
            reserved_at,
        );

        let hold = chrono::Duration::hours(24);
        assert!(!ticket.hold_expired(reserved_at + chrono::Duration::hours(23), hold));
        assert!(ticket.hold_expired(reserved_at + chrono::Duration::hours(25), hold));
    }
}
