use crate::{
    RadioCommand2012, RadioCommand2014, RadioError, RadioGeneration, RadioResponse2012,
    RadioResponse2014, RadioResponseHeader,
};

/// Split a tagged frame into its generation and payload, checking the payload
/// length against the generation's layout.
fn split_frame(
    data: &[u8],
    size_of: impl Fn(RadioGeneration) -> usize,
) -> Result<(RadioGeneration, &[u8]), RadioError> {
    let header = RadioResponseHeader::decode(data)?;
    let generation = header.generation()?;
    let payload = &data[RadioResponseHeader::SIZE..];
    let expected = size_of(generation);
    if payload.len() != expected {
        return Err(RadioError::PayloadSize {
            generation,
            expected,
            actual: payload.len(),
        });
    }
    Ok((generation, payload))
}

fn with_header(generation: RadioGeneration, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(RadioResponseHeader::SIZE + payload.len());
    out.extend_from_slice(&RadioResponseHeader::new(generation).encode());
    out.extend_from_slice(payload);
    out
}

/// A robot command of any generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioCommand {
    Gen2012(RadioCommand2012),
    Gen2014(RadioCommand2014),
}

impl RadioCommand {
    pub fn payload_size(generation: RadioGeneration) -> usize {
        match generation {
            RadioGeneration::Gen2012 => RadioCommand2012::SIZE,
            RadioGeneration::Gen2014 => RadioCommand2014::SIZE,
        }
    }

    pub fn generation(&self) -> RadioGeneration {
        match self {
            RadioCommand::Gen2012(_) => RadioGeneration::Gen2012,
            RadioCommand::Gen2014(_) => RadioGeneration::Gen2014,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            RadioCommand::Gen2012(c) => c.id,
            RadioCommand::Gen2014(c) => c.id,
        }
    }

    pub fn counter(&self) -> u8 {
        match self {
            RadioCommand::Gen2012(c) => c.counter,
            RadioCommand::Gen2014(c) => c.counter,
        }
    }

    /// The payload without header, as sent over the air.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            RadioCommand::Gen2012(c) => c.encode().to_vec(),
            RadioCommand::Gen2014(c) => c.encode().to_vec(),
        }
    }

    /// Header tag followed by the payload.
    pub fn encode(&self) -> Vec<u8> {
        with_header(self.generation(), &self.payload())
    }

    pub fn decode(data: &[u8]) -> Result<Self, RadioError> {
        let (generation, payload) = split_frame(data, Self::payload_size)?;
        Ok(match generation {
            RadioGeneration::Gen2012 => {
                let mut buf = [0u8; RadioCommand2012::SIZE];
                buf.copy_from_slice(payload);
                RadioCommand::Gen2012(RadioCommand2012::decode(&buf))
            }
            RadioGeneration::Gen2014 => {
                let mut buf = [0u8; RadioCommand2014::SIZE];
                buf.copy_from_slice(payload);
                RadioCommand::Gen2014(RadioCommand2014::decode(&buf))
            }
        })
    }

    /// Sideways and forward velocity in mm/s, angular velocity in mrad/s.
    /// Sideways is positive to the robot's right.
    pub fn velocity(&self) -> (i16, i16, i16) {
        match self {
            RadioCommand::Gen2012(c) => (c.v_x, c.v_y, c.omega),
            RadioCommand::Gen2014(c) => (c.v_s, c.v_f, c.omega),
        }
    }

    pub fn shot_power(&self) -> u8 {
        match self {
            RadioCommand::Gen2012(c) => c.shot_power,
            RadioCommand::Gen2014(c) => c.shot_power,
        }
    }

    pub fn chip(&self) -> bool {
        match self {
            RadioCommand::Gen2012(c) => c.chip,
            RadioCommand::Gen2014(c) => c.chip,
        }
    }

    pub fn dribbler(&self) -> i8 {
        match self {
            RadioCommand::Gen2012(c) => c.dribbler,
            RadioCommand::Gen2014(c) => c.dribbler,
        }
    }

    pub fn standby(&self) -> bool {
        match self {
            RadioCommand::Gen2012(c) => c.standby,
            RadioCommand::Gen2014(c) => c.standby,
        }
    }
}

/// A robot response of any generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioResponse {
    Gen2012(RadioResponse2012),
    Gen2014(RadioResponse2014),
}

impl RadioResponse {
    pub fn payload_size(generation: RadioGeneration) -> usize {
        match generation {
            RadioGeneration::Gen2012 => RadioResponse2012::SIZE,
            RadioGeneration::Gen2014 => RadioResponse2014::SIZE,
        }
    }

    /// Size of a full response frame including header. This is the
    /// `expected_response_size` the transceiver is told to wait for.
    pub fn frame_size(generation: RadioGeneration) -> usize {
        RadioResponseHeader::SIZE + Self::payload_size(generation)
    }

    pub fn generation(&self) -> RadioGeneration {
        match self {
            RadioResponse::Gen2012(_) => RadioGeneration::Gen2012,
            RadioResponse::Gen2014(_) => RadioGeneration::Gen2014,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            RadioResponse::Gen2012(r) => r.id,
            RadioResponse::Gen2014(r) => r.id,
        }
    }

    pub fn ball_detected(&self) -> bool {
        match self {
            RadioResponse::Gen2012(r) => r.ball_detected,
            RadioResponse::Gen2014(r) => r.ball_detected,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            RadioResponse::Gen2012(r) => with_header(RadioGeneration::Gen2012, &r.encode()),
            RadioResponse::Gen2014(r) => with_header(RadioGeneration::Gen2014, &r.encode()),
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, RadioError> {
        let (generation, payload) = split_frame(data, Self::payload_size)?;
        Ok(match generation {
            RadioGeneration::Gen2012 => {
                let mut buf = [0u8; RadioResponse2012::SIZE];
                buf.copy_from_slice(payload);
                RadioResponse::Gen2012(RadioResponse2012::decode(&buf))
            }
            RadioGeneration::Gen2014 => {
                let mut buf = [0u8; RadioResponse2014::SIZE];
                buf.copy_from_slice(payload);
                RadioResponse::Gen2014(RadioResponse2014::decode(&buf))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_selects_layout() {
        let response = RadioResponse::Gen2012(RadioResponse2012 {
            id: 4,
            battery: 50,
            ..Default::default()
        });
        let bytes = response.encode();
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes[0], 0x01);
        assert_eq!(RadioResponse::decode(&bytes), Ok(response));

        let response = RadioResponse::Gen2014(RadioResponse2014 {
            id: 4,
            v_f: 1000,
            ..Default::default()
        });
        let bytes = response.encode();
        assert_eq!(bytes.len(), 11);
        assert_eq!(bytes[0], 0x02);
        assert_eq!(RadioResponse::decode(&bytes), Ok(response));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut bytes = RadioResponse::Gen2012(RadioResponse2012::default()).encode();
        bytes[0] = 0x05;
        assert_eq!(
            RadioResponse::decode(&bytes),
            Err(RadioError::UnknownProtocolTag(0x05))
        );
        assert_eq!(
            RadioCommand::decode(&[0x00]),
            Err(RadioError::UnknownProtocolTag(0x00))
        );
    }

    #[test]
    fn wrong_payload_size_is_rejected() {
        let bytes = [0x02, 0, 0, 0];
        assert_eq!(
            RadioResponse::decode(&bytes),
            Err(RadioError::PayloadSize {
                generation: RadioGeneration::Gen2014,
                expected: 10,
                actual: 3,
            })
        );
        assert!(matches!(
            RadioCommand::decode(&[]),
            Err(RadioError::Truncated { .. })
        ));
    }

    #[test]
    fn command_accessors_are_generation_independent() {
        let old = RadioCommand::Gen2012(RadioCommand2012 {
            id: 3,
            v_x: 10,
            v_y: 20,
            omega: 30,
            shot_power: 100,
            chip: true,
            ..Default::default()
        });
        let new = RadioCommand::Gen2014(RadioCommand2014 {
            id: 3,
            v_s: 10,
            v_f: 20,
            omega: 30,
            shot_power: 100,
            chip: true,
            ..Default::default()
        });
        for command in [old, new] {
            assert_eq!(command.id(), 3);
            assert_eq!(command.velocity(), (10, 20, 30));
            assert_eq!(command.shot_power(), 100);
            assert!(command.chip());
            assert_eq!(RadioCommand::decode(&command.encode()), Ok(command));
        }
    }
}
