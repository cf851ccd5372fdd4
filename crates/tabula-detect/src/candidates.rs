//! Candidate touchscreen controllers and their probe routines.
//!
//! Each supported controller gets one probe: a minimal byte exchange at
//! the controller's fixed bus address that fingerprints the protocol
//! without driving the device. Probes return a tri-state
//! [`ProbeVerdict`] so that "nothing answered" and "the bus is broken"
//! can never be conflated.

use serde::Serialize;
use std::time::Duration;
use tabula_hal::{BusAdapter, HalError};
use tokio::time::sleep;
use tracing::{info, warn};

/// Register holding the silead 32-bit identity word.
const SILEAD_ID_REGISTER: u8 = 0xFC;
/// Identity word of the gsl1680 A082 die.
const SILEAD_ID_A082: u32 = 0xa082_0000;
/// Identity word of the gsl1680 B482 die.
const SILEAD_ID_B482: u32 = 0xb482_0000;

/// ektf2127 request opcode.
const EKTF2127_REQUEST: u8 = 0x53;
/// ektf2127 response opcode.
const EKTF2127_RESPONSE: u8 = 0x52;
/// ektf2127 "width" parameter id.
const EKTF2127_WIDTH: u8 = 0x63;
/// Documented delay between an ektf2127 request and its response read.
const EKTF2127_SETTLE: Duration = Duration::from_millis(20);

/// Length of a zet6251 finger-data frame.
const ZET6251_FRAME_LEN: usize = 24;

/// Supported candidate controller families, in probe priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// Silead gsl1680 family (identity word at register 0xFC).
    Silead,
    /// Elan ektf2127 (request/response exchange).
    Ektf2127,
    /// Zeitec zet6251 (fixed-size finger-data frame).
    Zet6251,
}

/// One candidate to try: a controller family at its fixed bus address.
#[derive(Debug, Clone, Copy)]
pub struct CandidateDescriptor {
    /// Controller family this entry probes for.
    pub kind: CandidateKind,
    /// Fixed bus address the family responds at.
    pub addr: u16,
}

/// Probe priority order. The order is load-bearing: it encodes how the
/// supported boards collide on addresses and protocols, so a later entry
/// is only tried after every earlier one reported no match.
pub const CANDIDATES: &[CandidateDescriptor] = &[
    CandidateDescriptor {
        kind: CandidateKind::Silead,
        addr: 0x40,
    },
    CandidateDescriptor {
        kind: CandidateKind::Ektf2127,
        addr: 0x15,
    },
    CandidateDescriptor {
        kind: CandidateKind::Zet6251,
        addr: 0x76,
    },
];

/// Detected controller sub-model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubModel {
    /// gsl1680 with the A082 die.
    Gsl1680A082,
    /// gsl1680 with the B482 die.
    Gsl1680B482,
    /// ektf2127 (single known variant).
    Ektf2127,
    /// zet6251 (single known variant).
    Zet6251,
}

impl SubModel {
    /// Compatible string recorded in the device description.
    pub fn compatible(self) -> &'static str {
        match self {
            Self::Gsl1680A082 | Self::Gsl1680B482 => "silead,gsl1680",
            Self::Ektf2127 => "elan,ektf2127",
            Self::Zet6251 => "zeitec,zet6251",
        }
    }

    /// Short human-readable name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Gsl1680A082 => "gsl1680-a082",
            Self::Gsl1680B482 => "gsl1680-b482",
            Self::Ektf2127 => "ektf2127",
            Self::Zet6251 => "zet6251",
        }
    }

    /// True for the gsl1680 family, which often needs operator-supplied
    /// calibration overrides.
    pub fn is_gsl1680(self) -> bool {
        matches!(self, Self::Gsl1680A082 | Self::Gsl1680B482)
    }
}

/// Outcome of probing one candidate.
#[derive(Debug)]
pub enum ProbeVerdict {
    /// The candidate answered with a recognized fingerprint.
    Match {
        /// Which controller answered.
        sub_model: SubModel,
        /// Address it answered at.
        addr: u16,
    },
    /// The address is absent or does not speak this protocol.
    NoMatch,
    /// The transport reported a stuck bus; probing must stop.
    BusFault(HalError),
}

/// A controller found by a detection pass, with the power conditions it
/// was found under. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedDevice {
    /// Detected sub-model.
    pub sub_model: SubModel,
    /// Bus address the controller answered at.
    pub addr: u16,
    /// True if the controller only answered with the rail enabled.
    pub rail_required: bool,
    /// True if the board has a rail at all (whether or not it was needed).
    pub rail_present: bool,
}

impl CandidateDescriptor {
    /// Probe this candidate over the given bus.
    pub async fn probe<B: BusAdapter>(&self, bus: &mut B) -> ProbeVerdict {
        match self.kind {
            CandidateKind::Silead => probe_silead(bus, self.addr).await,
            CandidateKind::Ektf2127 => probe_ektf2127(bus, self.addr).await,
            CandidateKind::Zet6251 => probe_zet6251(bus, self.addr).await,
        }
    }
}

/// Collapse a transport error into a verdict: only a timeout is a bus
/// fault, everything else means the device is absent or alien.
fn fault_or_no_match(err: HalError) -> ProbeVerdict {
    if err.is_bus_fault() {
        ProbeVerdict::BusFault(err)
    } else {
        ProbeVerdict::NoMatch
    }
}

/// Silead gsl1680: read the 32-bit little-endian identity word and map the
/// known dies to sub-models. An unknown-but-plausible word is logged and
/// treated as no match, never as one.
async fn probe_silead<B: BusAdapter>(bus: &mut B, addr: u16) -> ProbeVerdict {
    let payload = match bus.read_block(addr, SILEAD_ID_REGISTER, 4).await {
        Ok(payload) => payload,
        Err(err) => return fault_or_no_match(err),
    };
    if payload.len() != 4 {
        return ProbeVerdict::NoMatch;
    }

    let chip_id = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    match chip_id {
        SILEAD_ID_A082 => {
            info!(chip_id = format_args!("{chip_id:#010x}"), "silead touchscreen identified");
            ProbeVerdict::Match {
                sub_model: SubModel::Gsl1680A082,
                addr,
            }
        }
        SILEAD_ID_B482 => {
            info!(chip_id = format_args!("{chip_id:#010x}"), "silead touchscreen identified");
            ProbeVerdict::Match {
                sub_model: SubModel::Gsl1680B482,
                addr,
            }
        }
        _ => {
            warn!(
                chip_id = format_args!("{chip_id:#010x}"),
                "silead-like device with unknown identity word"
            );
            ProbeVerdict::NoMatch
        }
    }
}

/// Elan ektf2127: read the hello frame (content depends on the initial
/// power state, so it is ignored), request the width, wait the documented
/// settle delay and check the response tag. The delay is part of the
/// protocol contract.
async fn probe_ektf2127<B: BusAdapter>(bus: &mut B, addr: u16) -> ProbeVerdict {
    let hello = match bus.recv(addr, 4).await {
        Ok(frame) => frame,
        Err(err) => return fault_or_no_match(err),
    };
    if hello.len() != 4 {
        return ProbeVerdict::NoMatch;
    }

    let request = [EKTF2127_REQUEST, EKTF2127_WIDTH, 0x00, 0x00];
    match bus.send(addr, &request).await {
        Ok(sent) if sent == request.len() => {}
        Ok(_) => return ProbeVerdict::NoMatch,
        Err(err) => return fault_or_no_match(err),
    }

    sleep(EKTF2127_SETTLE).await;

    let response = match bus.recv(addr, 4).await {
        Ok(frame) => frame,
        Err(err) => return fault_or_no_match(err),
    };
    if response.len() != 4 {
        return ProbeVerdict::NoMatch;
    }

    if response[0] == EKTF2127_RESPONSE && response[1] == EKTF2127_WIDTH {
        ProbeVerdict::Match {
            sub_model: SubModel::Ektf2127,
            addr,
        }
    } else {
        ProbeVerdict::NoMatch
    }
}

/// Zeitec zet6251: read one finger-data frame. Content is ignored because
/// unflashed parts answer with all 0xff; being able to read the frame at
/// all is the fingerprint.
async fn probe_zet6251<B: BusAdapter>(bus: &mut B, addr: u16) -> ProbeVerdict {
    let frame = match bus.recv(addr, ZET6251_FRAME_LEN).await {
        Ok(frame) => frame,
        Err(err) => return fault_or_no_match(err),
    };
    if frame.len() != ZET6251_FRAME_LEN {
        return ProbeVerdict::NoMatch;
    }

    ProbeVerdict::Match {
        sub_model: SubModel::Zet6251,
        addr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_hal::GpioLevel;
    use tabula_hal::PowerController;
    use tabula_hal::mock::{MockBoard, MockBus};

    /// A board with logic power up and the bus attached, so probe results
    /// depend only on what is fitted.
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
    async fn test_silead_a082_matches() {
        let board = MockBoard::new();
        board.fit_silead(0xa082_0000, false);
        let mut bus = powered_bus(&board).await;

        let verdict = probe_silead(&mut bus, 0x40).await;
        assert!(matches!(
            verdict,
            ProbeVerdict::Match {
                sub_model: SubModel::Gsl1680A082,
                addr: 0x40,
            }
        ));
    }

    #[tokio::test]
    async fn test_silead_b482_matches() {
        let board = MockBoard::new();
        board.fit_silead(0xb482_0000, false);
        let mut bus = powered_bus(&board).await;

        let verdict = probe_silead(&mut bus, 0x40).await;
        assert!(matches!(
            verdict,
            ProbeVerdict::Match {
                sub_model: SubModel::Gsl1680B482,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_silead_unknown_id_is_no_match() {
        let board = MockBoard::new();
        board.fit_silead(0xdead_beef, false);
        let mut bus = powered_bus(&board).await;

        let verdict = probe_silead(&mut bus, 0x40).await;
        assert!(matches!(verdict, ProbeVerdict::NoMatch));
    }

    #[tokio::test]
    async fn test_absent_device_is_no_match() {
        let board = MockBoard::new();
        let mut bus = powered_bus(&board).await;

        assert!(matches!(
            probe_silead(&mut bus, 0x40).await,
            ProbeVerdict::NoMatch
        ));
        assert!(matches!(
            probe_ektf2127(&mut bus, 0x15).await,
            ProbeVerdict::NoMatch
        ));
        assert!(matches!(
            probe_zet6251(&mut bus, 0x76).await,
            ProbeVerdict::NoMatch
        ));
    }

    #[tokio::test]
    async fn test_stuck_bus_is_a_fault_not_no_match() {
        let board = MockBoard::new();
        board.fit_silead(0xa082_0000, false);
        board.stick_bus();
        let mut bus = powered_bus(&board).await;

        assert!(matches!(
            probe_silead(&mut bus, 0x40).await,
            ProbeVerdict::BusFault(_)
        ));
        assert!(matches!(
            probe_ektf2127(&mut bus, 0x15).await,
            ProbeVerdict::BusFault(_)
        ));
        assert!(matches!(
            probe_zet6251(&mut bus, 0x76).await,
            ProbeVerdict::BusFault(_)
        ));
    }

    #[tokio::test]
    async fn test_short_read_is_no_match() {
        let board = MockBoard::new();
        // Acknowledges but answers every exchange with an empty transfer.
        board.fit_mute(0x40, false);
        board.fit_mute(0x76, false);
        let mut bus = powered_bus(&board).await;

        assert!(matches!(
            probe_silead(&mut bus, 0x40).await,
            ProbeVerdict::NoMatch
        ));
        assert!(matches!(
            probe_zet6251(&mut bus, 0x76).await,
            ProbeVerdict::NoMatch
        ));
    }

    #[tokio::test]
    async fn test_ektf2127_matches() {
        let board = MockBoard::new();
        board.fit_ektf2127(false);
        let mut bus = powered_bus(&board).await;

        let verdict = probe_ektf2127(&mut bus, 0x15).await;
        assert!(matches!(
            verdict,
            ProbeVerdict::Match {
                sub_model: SubModel::Ektf2127,
                addr: 0x15,
            }
        ));
    }

    #[tokio::test]
    async fn test_zet6251_matches() {
        let board = MockBoard::new();
        board.fit_zet6251(false);
        let mut bus = powered_bus(&board).await;

        let verdict = probe_zet6251(&mut bus, 0x76).await;
        assert!(matches!(
            verdict,
            ProbeVerdict::Match {
                sub_model: SubModel::Zet6251,
                addr: 0x76,
            }
        ));
    }

    #[test]
    fn test_candidate_priority_order() {
        let addrs: Vec<u16> = CANDIDATES.iter().map(|c| c.addr).collect();
        assert_eq!(addrs, [0x40, 0x15, 0x76]);
        assert_eq!(CANDIDATES[0].kind, CandidateKind::Silead);
    }

    #[test]
    fn test_compatible_strings() {
        assert_eq!(SubModel::Gsl1680A082.compatible(), "silead,gsl1680");
        assert_eq!(SubModel::Gsl1680B482.compatible(), "silead,gsl1680");
        assert_eq!(SubModel::Ektf2127.compatible(), "elan,ektf2127");
        assert_eq!(SubModel::Zet6251.compatible(), "zeitec,zet6251");
    }
}
