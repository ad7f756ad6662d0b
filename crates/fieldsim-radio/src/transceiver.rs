//! Framing used on the USB link between the host and the radio transceiver.
//!
//! Outgoing packets are `[command, size, address[5], expected_response_size]`
//! followed by `size` bytes of robot payload. Incoming data is a sequence of
//! `[size, command]` records, each followed by `size` bytes.

use crate::{RadioCommand, RadioError, RadioResponse, ADDRESS_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransceiverCommand {
    Init = 0x00,
    Ping = 0x01,
    Status = 0x02,
    SetFrequency = 0x10,
    SendNrf24 = 0x11,
    SendNrf24Data = 0x12,
    InitReply = 0x80,
    PingReply = 0x81,
    StatusReply = 0x82,
    ReplyFromRobot = 0x90,
    SendNrf24DataFailed = 0x91,
    DatagramReceived = 0x92,
}

impl TransceiverCommand {
    pub fn from_u8(value: u8) -> Option<Self> {
        use TransceiverCommand::*;
        Some(match value {
            0x00 => Init,
            0x01 => Ping,
            0x02 => Status,
            0x10 => SetFrequency,
            0x11 => SendNrf24,
            0x12 => SendNrf24Data,
            0x80 => InitReply,
            0x81 => PingReply,
            0x82 => StatusReply,
            0x90 => ReplyFromRobot,
            0x91 => SendNrf24DataFailed,
            0x92 => DatagramReceived,
            _ => return None,
        })
    }
}

const SEND_HEADER_SIZE: usize = 2 + ADDRESS_SIZE + 1;
const REPLY_HEADER_SIZE: usize = 2;

/// Wrap a payload for transmission to `address`. The transceiver listens for
/// `expected_response_size` bytes after sending.
pub fn encode_send_nrf24(
    address: &[u8; ADDRESS_SIZE],
    expected_response_size: u8,
    payload: &[u8],
) -> Result<Vec<u8>, RadioError> {
    let size = u8::try_from(payload.len()).map_err(|_| RadioError::PayloadTooLarge(payload.len()))?;
    let mut out = Vec::with_capacity(SEND_HEADER_SIZE + payload.len());
    out.push(TransceiverCommand::SendNrf24 as u8);
    out.push(size);
    out.extend_from_slice(address);
    out.push(expected_response_size);
    out.extend_from_slice(payload);
    Ok(out)
}

/// Wrap a robot command, addressed to the robot it names. Commands travel
/// without a header, the address already selects the generation.
pub fn encode_command(command: &RadioCommand) -> Result<Vec<u8>, RadioError> {
    let generation = command.generation();
    let address = crate::robot_address(generation, command.id());
    // frame sizes are far below 256 bytes
    let expected = RadioResponse::frame_size(generation) as u8;
    encode_send_nrf24(&address, expected, &command.payload())
}

/// Parse a buffer read from the transceiver. Only robot replies are returned;
/// other records are skipped. A record cut off at the end of the buffer
/// yields a [`RadioError::Truncated`] entry and ends parsing.
pub fn decode_replies(buffer: &[u8]) -> Vec<Result<RadioResponse, RadioError>> {
    let mut replies = Vec::new();
    let mut pos = 0;
    while pos < buffer.len() {
        if pos + REPLY_HEADER_SIZE > buffer.len() {
            replies.push(Err(RadioError::Truncated {
                needed: REPLY_HEADER_SIZE,
                actual: buffer.len() - pos,
            }));
            break;
        }
        let size = buffer[pos] as usize;
        let command = buffer[pos + 1];
        pos += REPLY_HEADER_SIZE;
        if pos + size > buffer.len() {
            replies.push(Err(RadioError::Truncated {
                needed: size,
                actual: buffer.len() - pos,
            }));
            break;
        }
        let data = &buffer[pos..pos + size];
        pos += size;

        match TransceiverCommand::from_u8(command) {
            Some(TransceiverCommand::ReplyFromRobot) => replies.push(RadioResponse::decode(data)),
            Some(other) => log::debug!("Skipping transceiver record {:?}", other),
            None => log::warn!("Unknown transceiver command {:#04x}", command),
        }
    }
    replies
}
