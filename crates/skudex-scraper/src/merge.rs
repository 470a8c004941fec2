//! De-duplication of extracted records across pages and sources.

use std::collections::HashMap;

use skudex_core::{Platform, ProductRecord};

use crate::normalize::derive_discount;

/// Records are the same product when platform, SKU, and variant id all
/// agree. The same SKU on two platforms stays two records.
type IdentityKey = (Platform, String, Option<String>);

/// Collapses duplicate records into one per identity key.
///
/// Output order is first-discovery order of each identity. When two
/// records collide, the one with more populated fields carries the
/// merged identity and its blanks are filled from the other; on a tie
/// the earlier record wins. Conflicting prices are logged and the
/// carrier's price kept.
#[must_use]
pub fn merge_records(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();
    let mut merged: Vec<ProductRecord> = Vec::new();

    for record in records {
        let key = identity_key(&record);
        if let Some(&slot) = index.get(&key) {
            merged[slot] = merge_pair(merged[slot].clone(), record);
        } else {
            index.insert(key, merged.len());
            merged.push(record);
        }
    }

    merged
}

fn identity_key(record: &ProductRecord) -> IdentityKey {
    (
        record.platform,
        record.sku.clone(),
        record.variant_id.clone(),
    )
}

/// Merges two records with the same identity. The record with more
/// populated fields becomes the carrier; the incumbent wins ties so the
/// earlier discovery is sticky.
fn merge_pair(incumbent: ProductRecord, newcomer: ProductRecord) -> ProductRecord {
    let (mut winner, loser) =
        if newcomer.populated_field_count() > incumbent.populated_field_count() {
            (newcomer, incumbent)
        } else {
            (incumbent, newcomer)
        };

    if let (Some(kept), Some(dropped)) = (winner.price, loser.price) {
        if kept != dropped {
            tracing::warn!(
                sku = %winner.sku,
                platform = %winner.platform,
                kept = %kept,
                dropped = %dropped,
                "conflicting prices for the same product identity"
            );
        }
    }

    if winner.name.trim().is_empty() && !loser.name.trim().is_empty() {
        winner.name = loser.name;
    }
    winner.group_id = winner.group_id.or(loser.group_id);
    winner.price = winner.price.or(loser.price);
    winner.rrp = winner.rrp.or(loser.rrp);
    winner.category = winner.category.or(loser.category);
    if winner.images.is_empty() {
        winner.images = loser.images;
    }
    if winner.breadcrumbs.is_empty() {
        winner.breadcrumbs = loser.breadcrumbs;
    }
    // Filling price or rrp from the loser can make a discount derivable
    // that neither side carried on its own.
    if winner.discount_pct.is_none() {
        winner.discount_pct = derive_discount(winner.price, winner.rrp);
    }

    winner
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
