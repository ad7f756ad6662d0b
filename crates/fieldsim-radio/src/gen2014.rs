//! Wire layout of the 2014 robot generation.

use crate::bits::{
    flag, pack_signed, read_i16, read_u32, set_flag, unpack_signed, write_i16, write_u32,
};

/// Width of the velocity fields packed into [`RadioResponse2014`].
const PACKED_SPEED_BITS: u32 = 14;

/// Commands sent to 2014 robots. Unlike the 2012 generation these also carry
/// the currently desired velocity and two planned deltas, which the robot
/// uses to extrapolate while packets are lost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadioCommand2014 {
    pub counter: u8,
    pub shot_power: u8,
    pub chip: bool,
    pub charge: bool,
    pub standby: bool,
    pub id: u8,
    pub force_kick: bool,
    pub dribbler: i8,
    pub v_s: i16,
    pub v_f: i16,
    pub omega: i16,
    /// 6 bits on the wire.
    pub ir_param: u8,
    pub eject_sdcard: bool,
    pub cur_v_s: i16,
    pub cur_v_f: i16,
    pub cur_omega: i16,
    pub v_s_delta: [i8; 2],
    pub v_f_delta: [i8; 2],
    pub omega_delta: [i8; 2],
}

impl RadioCommand2014 {
    pub const SIZE: usize = 23;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.counter;
        out[1] = self.shot_power;
        let mut flags = (self.id & 0x0F) << 3;
        set_flag(&mut flags, 0, self.chip);
        set_flag(&mut flags, 1, self.charge);
        set_flag(&mut flags, 2, self.standby);
        set_flag(&mut flags, 7, self.force_kick);
        out[2] = flags;
        out[3] = self.dribbler as u8;
        write_i16(&mut out, 4, self.v_s);
        write_i16(&mut out, 6, self.v_f);
        write_i16(&mut out, 8, self.omega);
        let mut misc = self.ir_param & 0x3F;
        set_flag(&mut misc, 6, self.eject_sdcard);
        out[10] = misc;
        write_i16(&mut out, 11, self.cur_v_s);
        write_i16(&mut out, 13, self.cur_v_f);
        write_i16(&mut out, 15, self.cur_omega);
        for step in 0..2 {
            out[17 + step * 3] = self.v_s_delta[step] as u8;
            out[18 + step * 3] = self.v_f_delta[step] as u8;
            out[19 + step * 3] = self.omega_delta[step] as u8;
        }
        out
    }

    pub(crate) fn decode(data: &[u8; Self::SIZE]) -> Self {
        Self {
            counter: data[0],
            shot_power: data[1],
            chip: flag(data[2], 0),
            charge: flag(data[2], 1),
            standby: flag(data[2], 2),
            id: (data[2] >> 3) & 0x0F,
            force_kick: flag(data[2], 7),
            dribbler: data[3] as i8,
            v_s: read_i16(data, 4),
            v_f: read_i16(data, 6),
            omega: read_i16(data, 8),
            ir_param: data[10] & 0x3F,
            eject_sdcard: flag(data[10], 6),
            cur_v_s: read_i16(data, 11),
            cur_v_f: read_i16(data, 13),
            cur_omega: read_i16(data, 15),
            v_s_delta: [data[17] as i8, data[20] as i8],
            v_f_delta: [data[18] as i8, data[21] as i8],
            omega_delta: [data[19] as i8, data[22] as i8],
        }
    }
}

/// Status reported back by 2014 robots. Velocities saturate at the 14 bit
/// range of the packed wire fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadioResponse2014 {
    pub counter: u8,
    pub id: u8,
    pub power_enabled: bool,
    pub error_present: bool,
    pub ball_detected: bool,
    pub cap_charged: bool,
    pub battery: u8,
    pub packet_loss: u8,
    /// Selects how the robot interprets the extension payload. Only 0, basic
    /// status, is produced by the simulator.
    pub extension_id: u8,
    pub v_s: i16,
    pub v_f: i16,
    pub omega: i16,
}

impl RadioResponse2014 {
    pub const SIZE: usize = 10;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.counter;
        let mut flags = self.id & 0x0F;
        set_flag(&mut flags, 4, self.power_enabled);
        set_flag(&mut flags, 5, self.error_present);
        set_flag(&mut flags, 6, self.ball_detected);
        set_flag(&mut flags, 7, self.cap_charged);
        out[1] = flags;
        out[2] = self.battery;
        out[3] = self.packet_loss;
        let packed = (self.extension_id as u32 & 0x0F)
            | pack_signed(self.v_s, PACKED_SPEED_BITS) << 4
            | pack_signed(self.v_f, PACKED_SPEED_BITS) << (4 + PACKED_SPEED_BITS);
        write_u32(&mut out, 4, packed);
        write_i16(&mut out, 8, self.omega);
        out
    }

    pub(crate) fn decode(data: &[u8; Self::SIZE]) -> Self {
        let packed = read_u32(data, 4);
        Self {
            counter: data[0],
            id: data[1] & 0x0F,
            power_enabled: flag(data[1], 4),
            error_present: flag(data[1], 5),
            ball_detected: flag(data[1], 6),
            cap_charged: flag(data[1], 7),
            battery: data[2],
            packet_loss: data[3],
            extension_id: (packed & 0x0F) as u8,
            v_s: unpack_signed(packed >> 4, PACKED_SPEED_BITS),
            v_f: unpack_signed(packed >> (4 + PACKED_SPEED_BITS), PACKED_SPEED_BITS),
            omega: read_i16(data, 8),
        }
    }
}
