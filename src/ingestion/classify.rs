//! Status vocabulary shared by the reducers

/// Lease status of a unit on the rent roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Current,
    NoticeUnrented,
    NoticeRented,
    VacantRented,
    VacantUnrented,
    Eviction,
    Unknown,
}

impl UnitStatus {
    /// Classify a raw `Status` value. Unrecognized values map to `Unknown`.
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "current" => UnitStatus::Current,
            "notice-unrented" => UnitStatus::NoticeUnrented,
            "notice-rented" => UnitStatus::NoticeRented,
            "vacant-rented" => UnitStatus::VacantRented,
            "vacant-unrented" => UnitStatus::VacantUnrented,
            // The platform exports "Evict"
            "evict" | "eviction" => UnitStatus::Eviction,
            _ => UnitStatus::Unknown,
        }
    }

    /// Unit is physically occupied today
    pub fn is_occupied(&self) -> bool {
        matches!(
            self,
            UnitStatus::Current
                | UnitStatus::Eviction
                | UnitStatus::NoticeUnrented
                | UnitStatus::NoticeRented
        )
    }

    /// Unit is occupied, or will be once a signed lease starts
    pub fn is_projected_occupied(&self) -> bool {
        matches!(
            self,
            UnitStatus::Current
                | UnitStatus::Eviction
                | UnitStatus::NoticeRented
                | UnitStatus::VacantRented
        )
    }

    /// Rent on this unit counts towards collectable rent
    pub fn is_collectable(&self) -> bool {
        matches!(
            self,
            UnitStatus::Current | UnitStatus::Eviction | UnitStatus::NoticeRented
        )
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitStatus::Current => write!(f, "current"),
            UnitStatus::NoticeUnrented => write!(f, "notice-unrented"),
            UnitStatus::NoticeRented => write!(f, "notice-rented"),
            UnitStatus::VacantRented => write!(f, "vacant-rented"),
            UnitStatus::VacantUnrented => write!(f, "vacant-unrented"),
            UnitStatus::Eviction => write!(f, "eviction"),
            UnitStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Prospect status on the guest card report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestCardStatus {
    Active,
    ApplicationCompleted,
    ShowingScheduled,
    Other,
}

impl GuestCardStatus {
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => GuestCardStatus::Active,
            "application completed" => GuestCardStatus::ApplicationCompleted,
            "showing scheduled" | "scheduled" => GuestCardStatus::ShowingScheduled,
            _ => GuestCardStatus::Other,
        }
    }
}

/// `Unit Status` vocabulary of the daily unit-status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOccupancy {
    Occupied,
    Notice,
    Eviction,
    Other,
}

impl UnitOccupancy {
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "occupied" => UnitOccupancy::Occupied,
            "notice" => UnitOccupancy::Notice,
            "eviction" => UnitOccupancy::Eviction,
            _ => UnitOccupancy::Other,
        }
    }

    pub fn is_occupied(&self) -> bool {
        !matches!(self, UnitOccupancy::Other)
    }

    pub fn is_projected_occupied(&self) -> bool {
        matches!(self, UnitOccupancy::Occupied | UnitOccupancy::Notice)
    }
}
