//! Color control payloads

use byteorder::{ByteOrder, LittleEndian};

use crate::pack::Pack;
use crate::utils::{ensure_length, ensure_space};
use crate::Error;

/// Move color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveColor {
    /// Rate of change of the X coordinate
    pub rate_x: i16,
    /// Rate of change of the Y coordinate
    pub rate_y: i16,
}

impl Pack<MoveColor, Error> for MoveColor {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        ensure_space(data, 4)?;
        LittleEndian::write_i16(&mut data[0..2], self.rate_x);
        LittleEndian::write_i16(&mut data[2..4], self.rate_y);
        Ok(4)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        ensure_length(data, 4)?;
        Ok((
            MoveColor {
                rate_x: LittleEndian::read_i16(&data[0..2]),
                rate_y: LittleEndian::read_i16(&data[2..4]),
            },
            4,
        ))
    }
}

/// Step color, with optional transition time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepColor {
    /// Change of the X coordinate
    pub step_x: i16,
    /// Change of the Y coordinate
    pub step_y: i16,
    /// Transition time in 1/10 seconds
    pub transition_time: Option<u16>,
}

impl Pack<StepColor, Error> for StepColor {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let length = if self.transition_time.is_some() { 6 } else { 4 };
        ensure_space(data, length)?;
        LittleEndian::write_i16(&mut data[0..2], self.step_x);
        LittleEndian::write_i16(&mut data[2..4], self.step_y);
        if let Some(time) = self.transition_time {
            LittleEndian::write_u16(&mut data[4..6], time);
        }
        Ok(length)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        ensure_length(data, 4)?;
        let (transition_time, used) = if data.len() >= 6 {
            (Some(LittleEndian::read_u16(&data[4..6])), 6)
        } else {
            (None, 4)
        };
        Ok((
            StepColor {
                step_x: LittleEndian::read_i16(&data[0..2]),
                step_y: LittleEndian::read_i16(&data[2..4]),
                transition_time,
            },
            used,
        ))
    }
}
