//! Delinquency reducer
//!
//! Percentages are taken against collectable rent stored by an earlier rent
//! roll run, so rent roll files must be committed before delinquency files
//! when same-day figures are wanted. The caller supplies that lookup.

use crate::ingestion::reduce::PropertyLedger;
use crate::ingestion::types::{CollectableRent, DelinquencySummary, RawRow};
use crate::ingestion::utils::{field, fixed2, parse_amount, percentage, property_id};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DelinquencyTotals {
    pub total_receivable: Decimal,
    pub total_delinquent_rent: Decimal,
}

/// Sum receivable and delinquent rent per property
pub fn accumulate(rows: &[RawRow]) -> PropertyLedger<DelinquencyTotals> {
    let mut ledger: PropertyLedger<DelinquencyTotals> = PropertyLedger::new();

    for row in rows {
        let Some(pid) = property_id(row) else {
            continue;
        };

        let receivable = parse_amount(field(row, "Amount Receivable"));
        let delinquent_rent = parse_amount(field(row, "Delinquent Rent"));

        // A row is counted whole or not at all
        let totals = ledger.entry(pid);
        let (Some(total_receivable), Some(total_delinquent_rent)) = (
            totals.total_receivable.checked_add(receivable),
            totals.total_delinquent_rent.checked_add(delinquent_rent),
        ) else {
            warn!("Delinquency amounts overflow for property {}, row skipped", pid);
            continue;
        };
        totals.total_receivable = total_receivable;
        totals.total_delinquent_rent = total_delinquent_rent;
    }

    ledger
}

/// Turn accumulated totals into summaries using previously stored collectable rent
pub fn finalize(
    ledger: PropertyLedger<DelinquencyTotals>,
    report_date: Option<NaiveDate>,
    collectable: &CollectableRent,
) -> Vec<DelinquencySummary> {
    ledger
        .into_iter()
        .map(|(pid, totals)| {
            let collectable_rent = collectable.get(&pid).copied().unwrap_or(Decimal::ZERO);
            let delinquent_fees = totals
                .total_receivable
                .checked_sub(totals.total_delinquent_rent)
                .unwrap_or_else(|| {
                    warn!("Delinquent fees overflow for property {}, storing 0.00", pid);
                    Decimal::ZERO
                });

            DelinquencySummary {
                report_date,
                total_receivable: fixed2(totals.total_receivable),
                total_delinquent_rent: fixed2(totals.total_delinquent_rent),
                delinquent_fees: fixed2(delinquent_fees),
                delinquent_subsidy: fixed2(Decimal::ZERO),
                total_rent: fixed2(Decimal::ZERO),
                delinquency_percent_receivable: percentage(
                    totals.total_receivable,
                    collectable_rent,
                ),
                delinquency_percent_rent_only: percentage(
                    totals.total_delinquent_rent,
                    collectable_rent,
                ),
                property_id: pid,
            }
        })
        .collect()
}

pub fn reduce_delinquency(
    rows: &[RawRow],
    report_date: Option<NaiveDate>,
    collectable: &CollectableRent,
) -> Vec<DelinquencySummary> {
    finalize(accumulate(rows), report_date, collectable)
}
