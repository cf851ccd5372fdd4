//! Mock bus adapter.

use super::{DeviceSim, SharedState, lock};
use crate::error::{HalError, Result};
use crate::traits::BusAdapter;

const SILEAD_ID_REGISTER: u8 = 0xFC;
const EKTF_REQUEST: u8 = 0x53;
const EKTF_RESPONSE: u8 = 0x52;
const EKTF_WIDTH: u8 = 0x63;

/// Bus adapter view of a [`MockBoard`](super::MockBoard).
///
/// Transfers follow the [`BusAdapter`] contract: unfitted or unpowered
/// addresses NAK, a stuck bus times out, and fitted devices that do not
/// understand an exchange return short (empty) transfers.
#[derive(Debug)]
pub struct MockBus {
    state: SharedState,
}

impl MockBus {
    pub(super) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

impl BusAdapter for MockBus {
    async fn attach(&mut self, node: &str) -> Result<()> {
        let mut st = lock(&self.state);
        if let Some(current) = &st.attached {
            return Err(HalError::busy(format!(
                "bus adapter already attached to '{current}'"
            )));
        }
        if !st.nodes.contains_key(node) {
            return Err(HalError::not_found(format!("description node '{node}'")));
        }
        st.attached = Some(node.to_string());
        st.attaches += 1;
        Ok(())
    }

    fn detach(&mut self) {
        let mut st = lock(&self.state);
        if st.attached.take().is_some() {
            st.detaches += 1;
        }
    }

    async fn read_block(&mut self, addr: u16, register: u8, len: usize) -> Result<Vec<u8>> {
        let mut st = lock(&self.state);
        if st.attached.is_none() {
            return Err(HalError::NotAttached);
        }
        st.probe_log.push(addr);
        if st.bus_is_stuck() {
            return Err(HalError::timeout("block read"));
        }
        let Some(device) = st.devices.get(&addr) else {
            return Err(HalError::nak(addr));
        };
        if !st.device_responds(device) {
            return Err(HalError::nak(addr));
        }
        match device.sim {
            DeviceSim::Silead { chip_id } if register == SILEAD_ID_REGISTER => {
                let bytes = chip_id.to_le_bytes();
                Ok(bytes[..len.min(bytes.len())].to_vec())
            }
            // Anything else does not implement register reads; the
            // transfer completes short.
            _ => Ok(Vec::new()),
        }
    }

    async fn send(&mut self, addr: u16, bytes: &[u8]) -> Result<usize> {
        let mut st = lock(&self.state);
        if st.attached.is_none() {
            return Err(HalError::NotAttached);
        }
        st.probe_log.push(addr);
        if st.bus_is_stuck() {
            return Err(HalError::timeout("send"));
        }
        let responds = match st.devices.get(&addr) {
            Some(device) => st.device_responds(device),
            None => false,
        };
        if !responds {
            return Err(HalError::nak(addr));
        }
        let Some(device) = st.devices.get_mut(&addr) else {
            return Err(HalError::nak(addr));
        };
        device.last_request = Some(bytes.to_vec());
        Ok(bytes.len())
    }

    async fn recv(&mut self, addr: u16, len: usize) -> Result<Vec<u8>> {
        let mut st = lock(&self.state);
        if st.attached.is_none() {
            return Err(HalError::NotAttached);
        }
        st.probe_log.push(addr);
        if st.bus_is_stuck() {
            return Err(HalError::timeout("recv"));
        }
        let responds = match st.devices.get(&addr) {
            Some(device) => st.device_responds(device),
            None => false,
        };
        if !responds {
            return Err(HalError::nak(addr));
        }
        let Some(device) = st.devices.get_mut(&addr) else {
            return Err(HalError::nak(addr));
        };
        match device.sim {
            DeviceSim::Ektf2127 => {
                let pending_width_request = device
                    .last_request
                    .as_deref()
                    .is_some_and(|req| req.len() >= 2 && req[0] == EKTF_REQUEST && req[1] == EKTF_WIDTH);
                let mut frame = if pending_width_request {
                    device.last_request = None;
                    vec![EKTF_RESPONSE, EKTF_WIDTH, 0x00, 0x04]
                } else {
                    // Hello frame; content depends on power-up state, so
                    // real callers ignore it.
                    vec![0x55, 0x55, 0x55, 0x55]
                };
                frame.resize(len, 0x00);
                Ok(frame)
            }
            DeviceSim::Zet6251 => Ok(vec![0xff; len]),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{EKTF2127_MOCK_ADDR, MockBoard, ZET6251_MOCK_ADDR};
    use super::*;
    use crate::traits::PowerController;
    use crate::types::GpioLevel;

    #[tokio::test]
    async fn test_ops_require_attach() {
        let board = MockBoard::new();
        let mut bus = board.bus();
        let err = bus.recv(0x15, 4).await.unwrap_err();
        assert!(matches!(err, HalError::NotAttached));
    }

    #[tokio::test]
    async fn test_unfitted_address_naks() {
        let board = MockBoard::new();
        board.remove_gpio();
        let mut bus = board.bus();
        bus.attach("touchscreen").await.unwrap();
        let err = bus.recv(EKTF2127_MOCK_ADDR, 4).await.unwrap_err();
        assert!(matches!(err, HalError::Nak { addr } if addr == EKTF2127_MOCK_ADDR));
    }

    #[tokio::test]
    async fn test_ektf_request_response() {
        let board = MockBoard::new();
        board.remove_rail();
        board.fit_ektf2127(false);
        let mut power = board.power();
        let gpio = power.acquire_gpio("power-gpios").await.unwrap().unwrap();
        power.set_gpio(&gpio, GpioLevel::High).await.unwrap();

        let mut bus = board.bus();
        bus.attach("touchscreen").await.unwrap();

        let hello = bus.recv(EKTF2127_MOCK_ADDR, 4).await.unwrap();
        assert_eq!(hello.len(), 4);

        bus.send(EKTF2127_MOCK_ADDR, &[EKTF_REQUEST, EKTF_WIDTH, 0x00, 0x00])
            .await
            .unwrap();
        let response = bus.recv(EKTF2127_MOCK_ADDR, 4).await.unwrap();
        assert_eq!(response[0], EKTF_RESPONSE);
        assert_eq!(response[1], EKTF_WIDTH);

        // The request was consumed; the next receive is a hello again.
        let next = bus.recv(EKTF2127_MOCK_ADDR, 4).await.unwrap();
        assert_ne!(next[0], EKTF_RESPONSE);

        power.release_gpio(gpio);
    }

    #[tokio::test]
    async fn test_zet_frame_is_all_ff() {
        let board = MockBoard::new();
        board.remove_rail();
        board.remove_gpio();
        board.fit_zet6251(false);

        let mut bus = board.bus();
        bus.attach("touchscreen").await.unwrap();
        let frame = bus.recv(ZET6251_MOCK_ADDR, 24).await.unwrap();
        assert_eq!(frame, vec![0xff; 24]);
    }

    #[tokio::test]
    async fn test_probe_log_records_addresses() {
        let board = MockBoard::new();
        board.remove_gpio();
        board.fit_zet6251(false);

        let mut bus = board.bus();
        bus.attach("touchscreen").await.unwrap();
        let _ = bus.read_block(0x40, 0xFC, 4).await;
        let _ = bus.recv(ZET6251_MOCK_ADDR, 24).await;

        assert_eq!(board.probed_addresses(), vec![0x40, ZET6251_MOCK_ADDR]);
    }
}
