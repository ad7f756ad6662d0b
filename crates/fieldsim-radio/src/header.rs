use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of every radio address, in bytes. The transceiver always transfers
/// full 5 byte addresses.
pub const ADDRESS_SIZE: usize = 5;

/// Address of the transceiver itself, the target of robot responses.
pub const TRANSCEIVER_ADDRESS: [u8; ADDRESS_SIZE] = [0x00, 0x00, 0x00, 0x00, 0x00];

/// Base address of 2012 generation robots. The robot id is OR-ed into the
/// last byte.
pub const ROBOT_2012_ADDRESS: [u8; ADDRESS_SIZE] = [0xAA, 0xC0, 0xFF, 0xEE, 0x20];

/// Base address of 2014 generation robots.
pub const ROBOT_2014_ADDRESS: [u8; ADDRESS_SIZE] = [0x40, 0xE8, 0xE4, 0xC7, 0x00];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RadioError {
    #[error("Unknown radio protocol tag: {0:#04x}")]
    UnknownProtocolTag(u8),
    #[error("Radio frame is truncated: needed {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("{generation:?} payload must be {expected} bytes, got {actual}")]
    PayloadSize {
        generation: RadioGeneration,
        expected: usize,
        actual: usize,
    },
    #[error("Payload of {0} bytes does not fit into a transceiver packet")]
    PayloadTooLarge(usize),
}

/// Hardware generation of a robot. The discriminant is the tag carried in
/// the [`RadioResponseHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadioGeneration {
    Gen2012 = 0x01,
    Gen2014 = 0x02,
}

impl RadioGeneration {
    pub fn from_tag(tag: u8) -> Result<Self, RadioError> {
        match tag {
            0x01 => Ok(RadioGeneration::Gen2012),
            0x02 => Ok(RadioGeneration::Gen2014),
            other => Err(RadioError::UnknownProtocolTag(other)),
        }
    }

    pub fn tag(&self) -> u8 {
        *self as u8
    }

    fn base_address(&self) -> [u8; ADDRESS_SIZE] {
        match self {
            RadioGeneration::Gen2012 => ROBOT_2012_ADDRESS,
            RadioGeneration::Gen2014 => ROBOT_2014_ADDRESS,
        }
    }
}

/// Address of a single robot. Ids are 4 bits wide on the wire.
pub fn robot_address(generation: RadioGeneration, id: u8) -> [u8; ADDRESS_SIZE] {
    let mut address = generation.base_address();
    address[ADDRESS_SIZE - 1] |= id & 0x0F;
    address
}

/// Single byte header in front of every response payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioResponseHeader {
    pub command: u8,
}

impl RadioResponseHeader {
    pub const SIZE: usize = 1;

    pub fn new(generation: RadioGeneration) -> Self {
        Self {
            command: generation.tag(),
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        [self.command]
    }

    /// Read the header from the start of `data`. The tag is not validated
    /// here, see [`RadioResponseHeader::generation`].
    pub fn decode(data: &[u8]) -> Result<Self, RadioError> {
        match data.first() {
            Some(&command) => Ok(Self { command }),
            None => Err(RadioError::Truncated {
                needed: Self::SIZE,
                actual: 0,
            }),
        }
    }

    pub fn generation(&self) -> Result<RadioGeneration, RadioError> {
        RadioGeneration::from_tag(self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_map_to_generations() {
        assert_eq!(RadioGeneration::from_tag(0x01), Ok(RadioGeneration::Gen2012));
        assert_eq!(RadioGeneration::from_tag(0x02), Ok(RadioGeneration::Gen2014));
        for tag in [0x00, 0x03, 0x7F, 0xFF] {
            assert_eq!(
                RadioGeneration::from_tag(tag),
                Err(RadioError::UnknownProtocolTag(tag))
            );
        }
    }

    #[test]
    fn header_is_one_byte() {
        let header = RadioResponseHeader::new(RadioGeneration::Gen2014);
        assert_eq!(header.encode(), [0x02]);
        assert_eq!(RadioResponseHeader::decode(&[0x02, 0xFF]).unwrap(), header);
        assert!(matches!(
            RadioResponseHeader::decode(&[]),
            Err(RadioError::Truncated { needed: 1, actual: 0 })
        ));
    }

    #[test]
    fn robot_address_embeds_id() {
        assert_eq!(
            robot_address(RadioGeneration::Gen2012, 5),
            [0xAA, 0xC0, 0xFF, 0xEE, 0x25]
        );
        assert_eq!(
            robot_address(RadioGeneration::Gen2014, 0x1F),
            [0x40, 0xE8, 0xE4, 0xC7, 0x0F]
        );
        assert_eq!(TRANSCEIVER_ADDRESS.len(), ADDRESS_SIZE);
    }
}
