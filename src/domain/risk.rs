//! Position sizing from account risk.

use serde::Serialize;

use super::error::ChartistError;

#[derive(Debug, Clone, Serialize)]
pub struct RMultiple {
    pub take_profit: f64,
    pub r: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionSizing {
    pub account_size: f64,
    pub risk_pct: f64,
    /// Capital at risk if the stop is hit.
    pub risk_amount: f64,
    pub per_unit_risk: f64,
    pub position_size: f64,
    pub r_multiples: Vec<RMultiple>,
}

/// Size a position so that hitting the stop loses `risk_pct` of the account,
/// and express each take-profit as a multiple of that risk.
///
/// The trade direction is inferred from the entry/stop relation: a stop
/// below the entry means long, above means short.
pub fn position_sizing(
    account_size: f64,
    risk_pct: f64,
    entry: f64,
    stop: f64,
    take_profits: &[f64],
) -> Result<PositionSizing, ChartistError> {
    if account_size <= 0.0 {
        return Err(ChartistError::InvalidParameter {
            name: "account_size".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if risk_pct <= 0.0 {
        return Err(ChartistError::InvalidParameter {
            name: "risk_pct".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    let per_unit_risk = (entry - stop).abs();
    if per_unit_risk <= 0.0 {
        return Err(ChartistError::InvalidParameter {
            name: "stop".to_string(),
            reason: "stop must differ from entry".to_string(),
        });
    }

    let risk_amount = account_size * risk_pct;
    let position_size = risk_amount / per_unit_risk;
    let long = entry >= stop;
    let r_multiples = take_profits
        .iter()
        .map(|&tp| {
            let reward = if long { tp - entry } else { entry - tp };
            RMultiple {
                take_profit: tp,
                r: reward / per_unit_risk,
            }
        })
        .collect();

    Ok(PositionSizing {
        account_size,
        risk_pct,
        risk_amount,
        per_unit_risk,
        position_size,
        r_multiples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_sizing_and_r_multiples() {
        let sizing = position_sizing(10_000.0, 0.01, 100.0, 98.0, &[104.0, 108.0]).unwrap();
        assert!((sizing.risk_amount - 100.0).abs() < f64::EPSILON);
        assert!((sizing.per_unit_risk - 2.0).abs() < f64::EPSILON);
        assert!((sizing.position_size - 50.0).abs() < f64::EPSILON);
        assert!((sizing.r_multiples[0].r - 2.0).abs() < f64::EPSILON);
        assert!((sizing.r_multiples[1].r - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_sizing_rewards_falling_targets() {
        let sizing = position_sizing(10_000.0, 0.01, 100.0, 102.0, &[96.0]).unwrap();
        assert!((sizing.per_unit_risk - 2.0).abs() < f64::EPSILON);
        assert!((sizing.r_multiples[0].r - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stop_at_entry_is_rejected() {
        let err = position_sizing(10_000.0, 0.01, 100.0, 100.0, &[]).unwrap_err();
        assert!(matches!(
            err,
            ChartistError::InvalidParameter { ref name, .. } if name == "stop"
        ));
    }

    #[test]
    fn non_positive_account_or_risk_is_rejected() {
        assert!(position_sizing(0.0, 0.01, 100.0, 98.0, &[]).is_err());
        assert!(position_sizing(10_000.0, 0.0, 100.0, 98.0, &[]).is_err());
    }

    #[test]
    fn target_beyond_the_stop_reads_negative() {
        // A long target below the entry has negative R.
        let sizing = position_sizing(10_000.0, 0.01, 100.0, 98.0, &[99.0]).unwrap();
        assert!(sizing.r_multiples[0].r < 0.0);
    }
}
