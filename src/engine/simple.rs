use crate::engine::{finite_or_zero, safe_divide, InitiativeMetrics};
use crate::initiative::Initiative;

/// Fixed unit delay the one-time value is spread over.
pub const UNIT_DELAY_WEEKS: f64 = 1.0;

/// $ per week of delay.
pub fn cost_of_delay(initiative: &Initiative) -> f64 {
    finite_or_zero(initiative.value_dollars / UNIT_DELAY_WEEKS)
}

/// Cost of delay divided by duration; 0 when effort is 0.
pub fn cd3(initiative: &Initiative) -> f64 {
    safe_divide(cost_of_delay(initiative), initiative.effort_weeks)
}

pub fn initiative_metrics(initiative: &Initiative) -> InitiativeMetrics {
    InitiativeMetrics {
        cost_of_delay: cost_of_delay(initiative),
        cd3: cd3(initiative),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{cd3, cost_of_delay, initiative_metrics};
    use crate::initiative::{Initiative, InitiativeId};

    fn item(effort: f64, value: f64) -> Initiative {
        Initiative::new(InitiativeId::from("t"), "T", effort, value)
    }

    #[test]
    fn computes_cod_and_cd3_for_sample_pair() {
        let a = initiative_metrics(&item(4.0, 1500.0));
        assert_eq!(a.cost_of_delay, 1500.0);
        assert_eq!(a.cd3, 375.0);
        let b = initiative_metrics(&item(2.0, 2000.0));
        assert_eq!(b.cost_of_delay, 2000.0);
        assert_eq!(b.cd3, 1000.0);
    }

    #[test]
    fn zero_effort_yields_zero_cd3() {
        assert_eq!(cd3(&item(0.0, 5000.0)), 0.0);
    }

    proptest! {
        #[test]
        fn cd3_is_cod_over_effort(effort in 0.5f64..=52.0, value in 0.0f64..1e9) {
            let initiative = item(effort, value);
            prop_assert_eq!(cd3(&initiative), cost_of_delay(&initiative) / effort);
        }
    }
}
