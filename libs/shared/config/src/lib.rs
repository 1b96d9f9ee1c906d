use std::env;
use tracing::warn;

/// Tunable policy for the booking workflow. Entity-level invariants (window
/// ordering, future starts, status transitions) are not configurable.
#[derive(Debug, Clone)]
pub struct SchedulingPolicy {
    /// Active appointments a patient may hold on a single calendar day.
    pub max_appointments_per_patient_per_day: u32,
    /// When set, a booking must fit inside an un-booked availability window
    /// of the doctor. Disable for clinics that do not publish rosters.
    pub require_open_availability: bool,
}

impl SchedulingPolicy {
    pub fn from_env() -> Self {
        let max_appointments_per_patient_per_day = env::var("MAX_APPOINTMENTS_PER_PATIENT_PER_DAY")
            .ok()
            .and_then(|raw| match raw.parse::<u32>() {
                Ok(value) if value > 0 => Some(value),
                _ => {
                    warn!("MAX_APPOINTMENTS_PER_PATIENT_PER_DAY is not a positive integer, using default");
                    None
                }
            })
            .unwrap_or(3);

        let require_open_availability = env::var("REQUIRE_OPEN_AVAILABILITY")
            .ok()
            .and_then(|raw| match raw.parse::<bool>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("REQUIRE_OPEN_AVAILABILITY is not a boolean, using default");
                    None
                }
            })
            .unwrap_or(true);

        Self {
            max_appointments_per_patient_per_day,
            require_open_availability,
        }
    }
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            max_appointments_per_patient_per_day: 3,
            require_open_availability: true,
        }
    }
}
