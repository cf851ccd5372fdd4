//! Probe orchestration: one pass over all candidates in priority order.

use crate::candidates::{CANDIDATES, ProbeVerdict};
use std::time::Duration;
use tabula_hal::BusAdapter;
use tokio::time::sleep;
use tracing::debug;

/// Settle time after changing power state, before the first probe.
pub const POWER_ON_SETTLE: Duration = Duration::from_millis(20);

/// Run one probe pass under the current power state.
///
/// Candidates are tried strictly in [`CANDIDATES`] order. The pass stops
/// at the first match, and a bus fault short-circuits the remaining
/// candidates — a stuck bus will not get better by addressing someone
/// else.
pub async fn run_pass<B: BusAdapter>(bus: &mut B) -> ProbeVerdict {
    sleep(POWER_ON_SETTLE).await;

    for candidate in CANDIDATES {
        debug!(
            kind = ?candidate.kind,
            addr = format_args!("{:#04x}", candidate.addr),
            "probing candidate"
        );
        match candidate.probe(bus).await {
            ProbeVerdict::NoMatch => continue,
            verdict => return verdict,
        }
    }

    ProbeVerdict::NoMatch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::SubModel;
    use tabula_hal::GpioLevel;
    use tabula_hal::PowerController;
    use tabula_hal::mock::{MockBoard, MockBus};

    async fn powered_bus(board: &MockBoard) -> MockBus {
        let mut power = board.power();
        if let Some(gpio) = power.acquire_gpio("power-gpios").await.unwrap() {
            power.set_gpio(&gpio, GpioLevel::High).await.unwrap();
            power.release_gpio(gpio);
        }
        let mut bus = board.bus();
        bus.attach("touchscreen").await.unwrap();
        bus
    }

    #[tokio::test]
    async fn test_first_match_in_priority_order_wins() {
        let board = MockBoard::new();
        // Both would match on their own; the earlier-listed one must win.
        board.fit_silead(0xa082_0000, false);
        board.fit_zet6251(false);
        let mut bus = powered_bus(&board).await;

        let verdict = run_pass(&mut bus).await;
        assert!(matches!(
            verdict,
            ProbeVerdict::Match {
                sub_model: SubModel::Gsl1680A082,
                addr: 0x40,
            }
        ));
        // The later candidate was never addressed.
        assert!(!board.probed_addresses().contains(&0x76));
    }

    #[tokio::test]
    async fn test_later_candidate_reached_after_no_match() {
        let board = MockBoard::new();
        board.fit_zet6251(false);
        let mut bus = powered_bus(&board).await;

        let verdict = run_pass(&mut bus).await;
        assert!(matches!(
            verdict,
            ProbeVerdict::Match {
                sub_model: SubModel::Zet6251,
                addr: 0x76,
            }
        ));
    }

    #[tokio::test]
    async fn test_fault_short_circuits_remaining_candidates() {
        let board = MockBoard::new();
        board.stick_bus();
        let mut bus = powered_bus(&board).await;

        let verdict = run_pass(&mut bus).await;
        assert!(matches!(verdict, ProbeVerdict::BusFault(_)));
        // Only the first candidate's first transfer happened.
        assert_eq!(board.probed_addresses(), vec![0x40]);
    }

    #[tokio::test]
    async fn test_exhausted_candidates_yield_no_match() {
        let board = MockBoard::new();
        let mut bus = powered_bus(&board).await;

        assert!(matches!(run_pass(&mut bus).await, ProbeVerdict::NoMatch));
        // All three were tried, in order.
        assert_eq!(board.probed_addresses(), vec![0x40, 0x15, 0x76]);
    }
}
