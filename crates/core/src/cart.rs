//! Cart lines, the client-held cart cache, and reconciliation of an
//! anonymous cart into a persisted one.
//!
//! A cart line is identified by its [`CartKey`]: the product plus the
//! optional size and color variant. The owner is implied by the repository
//! holding the line. Two repositories exist:
//!
//! - [`LocalCartRepository`] -- the unauthenticated, client-held cart. It has
//!   no owner and lives entirely in memory (the browser serialises it to
//!   local storage).
//! - a server-side implementation of [`CartRepository`] (see
//!   `closet_db::ServerCartRepository`), which persists lines per user.
//!
//! [`reconcile`] folds a sequence of local entries into a server cart. It is
//! additive: quantities for an existing key are summed, never overwritten.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Smallest quantity a cart line may hold.
pub const MIN_QUANTITY: i32 = 1;

// ---------------------------------------------------------------------------
// Keys and entries
// ---------------------------------------------------------------------------

/// Compound key identifying one cart line within an owner's cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    pub product_id: DbId,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl CartKey {
    /// Build a key, normalising blank variants to `None`.
    pub fn new(product_id: DbId, size: Option<String>, color: Option<String>) -> Self {
        Self {
            product_id,
            size: normalize_variant(size),
            color: normalize_variant(color),
        }
    }
}

/// Trim a size/color value; empty strings mean "no variant".
pub fn normalize_variant(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reject quantities below [`MIN_QUANTITY`].
pub fn validate_quantity(quantity: i32) -> Result<(), CoreError> {
    if quantity < MIN_QUANTITY {
        return Err(CoreError::Validation(format!(
            "quantity must be at least {MIN_QUANTITY}, got {quantity}"
        )));
    }
    Ok(())
}

/// Read access shared by every cart line representation.
pub trait CartLineRef {
    fn product_id(&self) -> DbId;
    fn quantity(&self) -> i32;
    fn size(&self) -> Option<&str>;
    fn color(&self) -> Option<&str>;

    fn key(&self) -> CartKey {
        CartKey::new(
            self.product_id(),
            self.size().map(str::to_owned),
            self.color().map(str::to_owned),
        )
    }
}

/// An owner-less cart entry, as sent by the client for merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product_id: DbId,
    pub quantity: i32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CartEntry {
    pub fn new(
        product_id: DbId,
        quantity: i32,
        size: Option<String>,
        color: Option<String>,
    ) -> Self {
        Self {
            product_id,
            quantity,
            size: normalize_variant(size),
            color: normalize_variant(color),
        }
    }
}

impl CartLineRef for CartEntry {
    fn product_id(&self) -> DbId {
        self.product_id
    }

    fn quantity(&self) -> i32 {
        self.quantity
    }

    fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Server-side repository seam
// ---------------------------------------------------------------------------

/// Persistent storage for per-owner cart lines.
pub trait CartRepository: Send + Sync {
    /// The stored line type returned to callers.
    type Line: Send;
    /// Storage error type.
    type Error: Send;

    /// Whether a product with this id exists in the catalog.
    fn product_exists(
        &self,
        product_id: DbId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Add `quantity` to the line at `key`, creating it if absent.
    fn add_quantity(
        &self,
        owner_id: DbId,
        key: &CartKey,
        quantity: i32,
    ) -> impl Future<Output = Result<Self::Line, Self::Error>> + Send;

    /// All lines currently held for `owner_id`.
    fn lines(
        &self,
        owner_id: DbId,
    ) -> impl Future<Output = Result<Vec<Self::Line>, Self::Error>> + Send;
}

/// Outcome of merging a batch of entries into a server cart.
#[derive(Debug, Clone)]
pub struct Reconciliation<L> {
    /// The owner's complete cart after the merge.
    pub lines: Vec<L>,
    /// Entries that were added to the cart.
    pub applied: usize,
    /// Entries skipped for a bad quantity or an unknown product.
    pub skipped: usize,
}

/// Merge `entries` into the cart of `owner_id`, in input order.
///
/// Invalid entries (quantity below the minimum, unknown product) are skipped
/// without failing the batch. A storage error stops processing; entries
/// already applied stay applied, and none is ever applied twice.
pub async fn reconcile<R: CartRepository>(
    repo: &R,
    owner_id: DbId,
    entries: &[CartEntry],
) -> Result<Reconciliation<R::Line>, R::Error> {
    let mut applied = 0;
    let mut skipped = 0;

    for entry in entries {
        if entry.quantity < MIN_QUANTITY {
            skipped += 1;
            continue;
        }
        if !repo.product_exists(entry.product_id).await? {
            skipped += 1;
            continue;
        }
        repo.add_quantity(owner_id, &entry.key(), entry.quantity).await?;
        applied += 1;
    }

    let lines = repo.lines(owner_id).await?;
    Ok(Reconciliation {
        lines,
        applied,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Client-held cart
// ---------------------------------------------------------------------------

/// The anonymous cart a visitor builds before logging in.
///
/// Mirrors the line semantics of the server cart so the two can be merged
/// with [`reconcile`]. Insertion order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCartRepository {
    entries: Vec<CartEntry>,
}

impl LocalCartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a cart previously serialised by the client.
    pub fn from_entries(entries: Vec<CartEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add to the line at `key`, summing with an existing line.
    pub fn add(&mut self, key: CartKey, quantity: i32) -> Result<&CartEntry, CoreError> {
        validate_quantity(quantity)?;
        let idx = match self.position(&key) {
            Some(idx) => {
                let line = &mut self.entries[idx];
                line.quantity = line.quantity.saturating_add(quantity);
                idx
            }
            None => {
                self.entries.push(CartEntry {
                    product_id: key.product_id,
                    quantity,
                    size: key.size,
                    color: key.color,
                });
                self.entries.len() - 1
            }
        };
        Ok(&self.entries[idx])
    }

    /// Set the quantity of an existing line.
    pub fn update(&mut self, key: &CartKey, quantity: i32) -> Result<&CartEntry, CoreError> {
        validate_quantity(quantity)?;
        let idx = self.position(key).ok_or(CoreError::NotFound {
            entity: "CartLine",
            id: key.product_id,
        })?;
        self.entries[idx].quantity = quantity;
        Ok(&self.entries[idx])
    }

    /// Remove the line at `key`.
    pub fn remove(&mut self, key: &CartKey) -> Result<CartEntry, CoreError> {
        let idx = self.position(key).ok_or(CoreError::NotFound {
            entity: "CartLine",
            id: key.product_id,
        })?;
        Ok(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Merge this cart into `owner_id`'s server cart.
    ///
    /// Local entries are cleared only when the merge succeeds. On error they
    /// are left untouched so the caller can retry. Returns `None` when there
    /// was nothing to merge.
    pub async fn sync_into<R: CartRepository>(
        &mut self,
        repo: &R,
        owner_id: DbId,
    ) -> Result<Option<Reconciliation<R::Line>>, R::Error> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let merged = reconcile(repo, owner_id, &self.entries).await?;
        self.entries.clear();
        Ok(Some(merged))
    }

    fn position(&self, key: &CartKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == *key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
