//! Inverse of a monotonic gross→net function.
//!
//! Net pay is a piecewise-linear, strictly increasing function of gross
//! pay, but the kinks (exemption tapers, band thresholds) make a closed-form
//! inverse different for every country. Instead the gross is found by a
//! damped fixed-point iteration:
//!
//! 1. bracket the answer between the target net (gross is never below net)
//!    and an upper bound found by doubling;
//! 2. step by `Δnet / slope`, with the slope measured over one euro, and
//!    fall back to bisection whenever that step would leave the bracket;
//! 3. stop once the net is within one cent of the target, or after
//!    [`MAX_ITERATIONS`] steps;
//! 4. snap to the whole cent, near the final iterate, whose net is closest
//!    to the target.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::common::round_half_up;

/// Upper limit on refinement steps.
pub const MAX_ITERATIONS: u32 = 20;

/// Doublings allowed while searching for an upper bound.
const MAX_BRACKET_DOUBLINGS: u32 = 32;

/// Outcome of [`solve_gross`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// Gross amount, rounded to whole cents.
    pub gross: Decimal,
    /// Refinement steps taken.
    pub iterations: u32,
    /// Whether the net came within one cent of the target before the
    /// iteration limit.
    pub converged: bool,
}

fn net_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Finds the gross amount whose net equals `target_net`.
///
/// `net_of` must be strictly increasing and never exceed its argument.
/// Returns `None` if `target_net` is not positive or no upper bound can be
/// found without overflowing.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::solver::solve_gross;
///
/// // A flat 25% deduction.
/// let solution = solve_gross(dec!(1500), |gross| gross * dec!(0.75)).unwrap();
///
/// assert_eq!(solution.gross, dec!(2000.00));
/// assert!(solution.converged);
/// ```
pub fn solve_gross<F>(
    target_net: Decimal,
    net_of: F,
) -> Option<Solution>
where
    F: Fn(Decimal) -> Decimal,
{
    if target_net <= Decimal::ZERO {
        return None;
    }

    let (mut lower, mut upper) = bracket(target_net, &net_of)?;
    let mut gross = (lower + upper) / Decimal::TWO;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let net = net_of(gross);
        let delta = target_net - net;
        debug!(iteration = iterations, %gross, %net, %delta, "net-to-gross step");

        if delta.abs() < net_tolerance() {
            converged = true;
            break;
        }
        if delta > Decimal::ZERO {
            lower = gross;
        } else {
            upper = gross;
        }

        let slope = net_of(gross + Decimal::ONE) - net;
        let mut next = if slope > Decimal::ZERO {
            gross + delta / slope
        } else {
            (lower + upper) / Decimal::TWO
        };
        if next <= lower || next >= upper {
            next = (lower + upper) / Decimal::TWO;
        }
        gross = next;
    }

    if !converged {
        warn!(
            %target_net,
            %gross,
            iterations,
            "net-to-gross iteration did not converge; using best estimate"
        );
    }

    Some(Solution {
        gross: snap_to_cent(target_net, gross, &net_of),
        iterations,
        converged,
    })
}

/// Returns `(lower, upper)` with `net_of(lower) <= target <= net_of(upper)`.
fn bracket<F>(
    target_net: Decimal,
    net_of: &F,
) -> Option<(Decimal, Decimal)>
where
    F: Fn(Decimal) -> Decimal,
{
    let lower = target_net;
    let mut upper = target_net.checked_mul(Decimal::TWO)?;
    let mut doublings = 0;
    while net_of(upper) < target_net {
        if doublings == MAX_BRACKET_DOUBLINGS {
            warn!(%target_net, %upper, "could not bracket gross amount");
            return None;
        }
        upper = upper.checked_mul(Decimal::TWO)?;
        doublings += 1;
    }
    Some((lower, upper))
}

/// Picks the positive whole-cent amount within two cents of `gross` whose
/// net is closest to `target_net`; the lower amount wins ties.
fn snap_to_cent<F>(
    target_net: Decimal,
    gross: Decimal,
    net_of: &F,
) -> Decimal
where
    F: Fn(Decimal) -> Decimal,
{
    let rounded = round_half_up(gross);
    let cent = net_tolerance();
    let mut best = rounded;
    let mut best_distance: Option<Decimal> = None;

    for offset in -2i64..=2 {
        let candidate = rounded + cent * Decimal::from(offset);
        if candidate <= Decimal::ZERO {
            continue;
        }
        let distance = (net_of(candidate) - target_net).abs();
        if best_distance.is_none_or(|d| distance < d) {
            best = candidate;
            best_distance = Some(distance);
        }
    }
    best
}
