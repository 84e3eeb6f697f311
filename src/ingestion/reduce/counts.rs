//! Single-pass tallies: guest cards, applications, showings, MTD receipts
//! and the daily unit-status snapshot

use crate::ingestion::classify::{GuestCardStatus, UnitOccupancy};
use crate::ingestion::reduce::PropertyLedger;
use crate::ingestion::types::{
    ApplicationSummary, GuestCardSummary, MtdReceivableSummary, RawRow, ShowingSummary,
    UnitStatusSummary,
};
use crate::ingestion::utils::{add_amount, field, fixed2, parse_receipt_amount, property_id, rate};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Rows per property
fn tally(rows: &[RawRow]) -> PropertyLedger<usize> {
    let mut ledger: PropertyLedger<usize> = PropertyLedger::new();
    for row in rows {
        if let Some(pid) = property_id(row) {
            *ledger.entry(pid) += 1;
        }
    }
    ledger
}

#[derive(Debug, Default)]
struct GuestCardTotals {
    total: usize,
    active: usize,
    applications: usize,
    showings: usize,
}

pub fn reduce_guest_cards(
    rows: &[RawRow],
    report_date: Option<NaiveDate>,
) -> Vec<GuestCardSummary> {
    let mut ledger: PropertyLedger<GuestCardTotals> = PropertyLedger::new();

    for row in rows {
        let Some(pid) = property_id(row) else {
            continue;
        };

        let totals = ledger.entry(pid);
        totals.total += 1;
        match GuestCardStatus::classify(field(row, "Status")) {
            GuestCardStatus::Active => totals.active += 1,
            GuestCardStatus::ApplicationCompleted => totals.applications += 1,
            GuestCardStatus::ShowingScheduled => totals.showings += 1,
            GuestCardStatus::Other => {}
        }
    }

    ledger
        .into_iter()
        .map(|(property_id, t)| GuestCardSummary {
            property_id,
            report_date,
            total_guest_cards: t.total,
            active_guest_cards: t.active,
            applications: t.applications,
            showings: t.showings,
        })
        .collect()
}

pub fn reduce_applications(
    rows: &[RawRow],
    report_date: Option<NaiveDate>,
) -> Vec<ApplicationSummary> {
    tally(rows)
        .into_iter()
        .map(|(property_id, applications)| ApplicationSummary {
            property_id,
            report_date,
            applications,
        })
        .collect()
}

pub fn reduce_showings(rows: &[RawRow], report_date: Option<NaiveDate>) -> Vec<ShowingSummary> {
    tally(rows)
        .into_iter()
        .map(|(property_id, showings)| ShowingSummary {
            property_id,
            report_date,
            showings,
        })
        .collect()
}

/// Sum `Receipt Amount` per property. Rows without a usable amount are skipped.
pub fn reduce_mtd_receivables(
    rows: &[RawRow],
    report_date: Option<NaiveDate>,
) -> Vec<MtdReceivableSummary> {
    let mut ledger: PropertyLedger<Decimal> = PropertyLedger::new();

    for row in rows {
        let Some(pid) = property_id(row) else {
            continue;
        };

        match parse_receipt_amount(field(row, "Receipt Amount")) {
            Some(amount) => {
                if !add_amount(ledger.entry(pid), amount) {
                    warn!("Receipt {} overflows the total for property {}, skipped", amount, pid);
                }
            }
            None => debug!("Skipping receipt without amount for property {}", pid),
        }
    }

    ledger
        .into_iter()
        .map(|(property_id, total)| MtdReceivableSummary {
            property_id,
            report_date,
            total_amount: fixed2(total),
        })
        .collect()
}

#[derive(Debug, Default)]
struct OccupancyTotals {
    total_units: usize,
    occupied_units: usize,
    projected_occupied_units: usize,
}

/// Occupancy from the `Unit Status` column of the daily unit-status report
pub fn reduce_unit_status(
    rows: &[RawRow],
    report_date: Option<NaiveDate>,
) -> Vec<UnitStatusSummary> {
    let mut ledger: PropertyLedger<OccupancyTotals> = PropertyLedger::new();

    for row in rows {
        let Some(pid) = property_id(row) else {
            continue;
        };

        let status = UnitOccupancy::classify(field(row, "Unit Status"));
        let totals = ledger.entry(pid);
        totals.total_units += 1;
        if status.is_occupied() {
            totals.occupied_units += 1;
        }
        if status.is_projected_occupied() {
            totals.projected_occupied_units += 1;
        }
    }

    ledger
        .into_iter()
        .map(|(property_id, t)| UnitStatusSummary {
            property_id,
            report_date,
            total_units: t.total_units,
            occupied_units: t.occupied_units,
            occupancy_rate: rate(t.occupied_units, t.total_units),
            projected_occupied_units: t.projected_occupied_units,
            projected_occupancy_rate: rate(t.projected_occupied_units, t.total_units),
        })
        .collect()
}
