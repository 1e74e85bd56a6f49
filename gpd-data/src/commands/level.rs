//! Move and step payloads, shared by level control, hue and saturation

use byteorder::{ByteOrder, LittleEndian};

use crate::pack::Pack;
use crate::utils::{ensure_length, ensure_space};
use crate::Error;

/// Move up or down, with optional rate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    /// Rate in units per second
    pub rate: Option<u8>,
}

impl Pack<Move, Error> for Move {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        match self.rate {
            Some(rate) => {
                ensure_space(data, 1)?;
                data[0] = rate;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        match data.first() {
            Some(rate) => Ok((Move { rate: Some(*rate) }, 1)),
            None => Ok((Move { rate: None }, 0)),
        }
    }
}

/// Step up or down, with optional transition time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Step size
    pub step_size: u8,
    /// Transition time in 1/10 seconds
    pub transition_time: Option<u16>,
}

impl Pack<Step, Error> for Step {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let length = if self.transition_time.is_some() { 3 } else { 1 };
        ensure_space(data, length)?;
        data[0] = self.step_size;
        if let Some(time) = self.transition_time {
            LittleEndian::write_u16(&mut data[1..3], time);
        }
        Ok(length)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        ensure_length(data, 1)?;
        if data.len() >= 3 {
            let transition_time = Some(LittleEndian::read_u16(&data[1..3]));
            Ok((
                Step {
                    step_size: data[0],
                    transition_time,
                },
                3,
            ))
        } else {
            Ok((
                Step {
                    step_size: data[0],
                    transition_time: None,
                },
                1,
            ))
        }
    }
}
