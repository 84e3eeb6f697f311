//! Rent roll reducer: occupancy, projected occupancy, lease expirations
//! and collectable rent for every property on the rent roll

use crate::ingestion::buckets::LeaseBucket;
use crate::ingestion::classify::UnitStatus;
use crate::ingestion::reduce::PropertyLedger;
use crate::ingestion::types::{RawRow, RentRollSummary};
use crate::ingestion::utils::{
    add_amount, field, fixed2, join_units, parse_amount, parse_lease_date, property_id, rate,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct RentRollTotals {
    total_units: usize,
    occupied_units: usize,
    projected_occupied_units: usize,
    vacant_rented: Vec<String>,
    vacant_unrented: Vec<String>,
    notice_rented: Vec<String>,
    notice_unrented: Vec<String>,
    notice_eviction: Vec<String>,
    lease_30: usize,
    lease_60: usize,
    lease_90: usize,
    lease_m2m: usize,
    collectable_rent: Decimal,
}

impl RentRollTotals {
    fn add_unit(&mut self, status: UnitStatus, unit: &str, rent: Decimal) {
        self.total_units += 1;

        if status.is_occupied() {
            self.occupied_units += 1;
        }
        if status.is_projected_occupied() {
            self.projected_occupied_units += 1;
        }
        if status.is_collectable() && !add_amount(&mut self.collectable_rent, rent) {
            warn!("Rent {} on unit {} overflows collectable rent, not counted", rent, unit);
        }

        let list = match status {
            UnitStatus::Current | UnitStatus::Unknown => None,
            UnitStatus::Eviction => Some(&mut self.notice_eviction),
            UnitStatus::NoticeUnrented => Some(&mut self.notice_unrented),
            UnitStatus::NoticeRented => Some(&mut self.notice_rented),
            UnitStatus::VacantRented => Some(&mut self.vacant_rented),
            UnitStatus::VacantUnrented => Some(&mut self.vacant_unrented),
        };
        if let Some(list) = list {
            list.push(unit.to_string());
        }
    }

    fn add_lease_end(&mut self, bucket: LeaseBucket) {
        match bucket {
            LeaseBucket::Days30 => self.lease_30 += 1,
            LeaseBucket::Days60 => self.lease_60 += 1,
            LeaseBucket::Days90 => self.lease_90 += 1,
            LeaseBucket::MonthToMonth => self.lease_m2m += 1,
        }
    }

    fn finalize(self, property_id: String, report_date: Option<NaiveDate>) -> RentRollSummary {
        RentRollSummary {
            property_id,
            report_date,
            total_units: self.total_units,
            occupied_units: self.occupied_units,
            occupancy_rate: rate(self.occupied_units, self.total_units),
            projected_occupied_units: self.projected_occupied_units,
            projected_occupancy_rate: rate(self.projected_occupied_units, self.total_units),
            vacant_rented_count: self.vacant_rented.len(),
            vacant_unrented_count: self.vacant_unrented.len(),
            notice_rented_count: self.notice_rented.len(),
            notice_unrented_count: self.notice_unrented.len(),
            notice_eviction_count: self.notice_eviction.len(),
            notice_eviction: join_units(&self.notice_eviction),
            lease_30: self.lease_30,
            lease_60: self.lease_60,
            lease_90: self.lease_90,
            lease_m2m: self.lease_m2m,
            collectable_rent: fixed2(self.collectable_rent),
            vacant_unrented_json: join_units(&self.vacant_unrented),
            vacant_rented_json: join_units(&self.vacant_rented),
            notice_unrented_json: join_units(&self.notice_unrented),
            notice_rented_json: join_units(&self.notice_rented),
        }
    }
}

/// Fold rent roll rows into one summary per property, in first-seen order.
/// `today` is the reference date for lease expiration buckets.
pub fn reduce_rent_roll(
    rows: &[RawRow],
    report_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<RentRollSummary> {
    let mut ledger: PropertyLedger<RentRollTotals> = PropertyLedger::new();

    for row in rows {
        let Some(pid) = property_id(row) else {
            continue;
        };

        let status = UnitStatus::classify(field(row, "Status"));
        let unit = field(row, "Unit");
        let rent = parse_amount(field(row, "Rent"));

        if status == UnitStatus::Unknown {
            debug!(
                "Unrecognized status {:?} for property {} unit {}",
                field(row, "Status"),
                pid,
                unit
            );
        }

        let totals = ledger.entry(pid);
        totals.add_unit(status, unit, rent);

        let lease_to = field(row, "Lease To");
        if !lease_to.is_empty() {
            match parse_lease_date(lease_to) {
                Some(lease_end) => {
                    if let Some(bucket) = LeaseBucket::for_lease_end(lease_end, today) {
                        totals.add_lease_end(bucket);
                    }
                }
                None => debug!("Unparsable lease end {:?} for property {}", lease_to, pid),
            }
        }
    }

    ledger
        .into_iter()
        .map(|(pid, totals)| totals.finalize(pid, report_date))
        .collect()
}
