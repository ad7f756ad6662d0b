//! Wire layout of the 2012 robot generation.

use crate::bits::{flag, read_i16, set_flag, write_i16};

/// Commands sent to 2012 robots. Velocities are in mm/s, `omega` in mrad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadioCommand2012 {
    pub counter: u8,
    pub shot_power: u8,
    pub chip: bool,
    pub charge: bool,
    pub standby: bool,
    /// 4 bits on the wire.
    pub id: u8,
    pub dribbler: i8,
    /// Sideways velocity.
    pub v_x: i16,
    /// Forward velocity.
    pub v_y: i16,
    pub omega: i16,
}

impl RadioCommand2012 {
    pub const SIZE: usize = 10;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.counter;
        out[1] = self.shot_power;
        let mut flags = (self.id & 0x0F) << 3;
        set_flag(&mut flags, 0, self.chip);
        set_flag(&mut flags, 1, self.charge);
        set_flag(&mut flags, 2, self.standby);
        out[2] = flags;
        out[3] = self.dribbler as u8;
        write_i16(&mut out, 4, self.v_x);
        write_i16(&mut out, 6, self.v_y);
        write_i16(&mut out, 8, self.omega);
        out
    }

    /// `data` must be exactly [`Self::SIZE`] bytes, checked by the caller.
    pub(crate) fn decode(data: &[u8; Self::SIZE]) -> Self {
        Self {
            counter: data[0],
            shot_power: data[1],
            chip: flag(data[2], 0),
            charge: flag(data[2], 1),
            standby: flag(data[2], 2),
            id: (data[2] >> 3) & 0x0F,
            dribbler: data[3] as i8,
            v_x: read_i16(data, 4),
            v_y: read_i16(data, 6),
            omega: read_i16(data, 8),
        }
    }
}

/// Status reported back by 2012 robots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadioResponse2012 {
    pub counter: u8,
    pub id: u8,
    pub main_active: bool,
    pub kicker_active: bool,
    pub ball_detected: bool,
    pub cap_charged: bool,
    /// Both scaled to 0..=255.
    pub battery: u8,
    pub packet_loss: u8,
    pub v_s: i16,
    pub v_f: i16,
    pub omega: i16,
    pub motor_in_power_limit: bool,
}

impl RadioResponse2012 {
    pub const SIZE: usize = 11;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.counter;
        let mut flags = self.id & 0x0F;
        set_flag(&mut flags, 4, self.main_active);
        set_flag(&mut flags, 5, self.kicker_active);
        set_flag(&mut flags, 6, self.ball_detected);
        set_flag(&mut flags, 7, self.cap_charged);
        out[1] = flags;
        out[2] = self.battery;
        out[3] = self.packet_loss;
        write_i16(&mut out, 4, self.v_s);
        write_i16(&mut out, 6, self.v_f);
        write_i16(&mut out, 8, self.omega);
        set_flag(&mut out[10], 0, self.motor_in_power_limit);
        out
    }

    pub(crate) fn decode(data: &[u8; Self::SIZE]) -> Self {
        Self {
            counter: data[0],
            id: data[1] & 0x0F,
            main_active: flag(data[1], 4),
            kicker_active: flag(data[1], 5),
            ball_detected: flag(data[1], 6),
            cap_charged: flag(data[1], 7),
            battery: data[2],
            packet_loss: data[3],
            v_s: read_i16(data, 4),
            v_f: read_i16(data, 6),
            omega: read_i16(data, 8),
            motor_in_power_limit: flag(data[10], 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_layout() {
        let command = RadioCommand2012 {
            counter: 7,
            shot_power: 200,
            chip: true,
            charge: true,
            standby: false,
            id: 9,
            dribbler: -3,
            v_x: -2,
            v_y: 0x1234,
            omega: 1000,
        };
        let bytes = command.encode();
        assert_eq!(
            bytes,
            [7, 200, 0b0100_1011, 0xFD, 0xFE, 0xFF, 0x34, 0x12, 0xE8, 0x03]
        );
        assert_eq!(RadioCommand2012::decode(&bytes), command);
    }

    #[test]
    fn command_id_is_masked() {
        let command = RadioCommand2012 {
            id: 0xFF,
            ..Default::default()
        };
        assert_eq!(command.encode()[2], 0b0111_1000);
    }

    #[test]
    fn response_layout() {
        let response = RadioResponse2012 {
            counter: 1,
            id: 3,
            main_active: true,
            kicker_active: false,
            ball_detected: true,
            cap_charged: true,
            battery: 80,
            packet_loss: 12,
            v_s: 100,
            v_f: -100,
            omega: 0,
            motor_in_power_limit: true,
        };
        let bytes = response.encode();
        assert_eq!(
            bytes,
            [1, 0b1101_0011, 80, 12, 100, 0, 0x9C, 0xFF, 0, 0, 1]
        );
        assert_eq!(RadioResponse2012::decode(&bytes), response);
    }
}
