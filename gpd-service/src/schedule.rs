//! # Transmit schedule
//!
//! Frames are repeated over the channels of the active channel group. The
//! group is advanced by the caller.

use heapless::Vec;

use gpd_data::commands::channel::{FIRST_CHANNEL, LAST_CHANNEL};

use crate::platform::Platform;
use crate::Error;

/// Largest number of channels in a schedule
pub const MAX_CHANNELS: usize = 16;

/// Channels and repetitions used when transmitting
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxSchedule {
    channels: Vec<u8, MAX_CHANNELS>,
    group_size: u8,
    repetitions: u8,
}

impl TxSchedule {
    /// Create a schedule
    ///
    /// The channel count must be a multiple of `group_size`, `group_size`
    /// and `repetitions` must be at least one and every channel must be in
    /// the 2.4 GHz band.
    pub fn new(channels: &[u8], group_size: u8, repetitions: u8) -> Result<Self, Error> {
        if channels.is_empty() || group_size == 0 || repetitions == 0 {
            return Err(Error::InvalidSchedule);
        }
        if channels.len() % group_size as usize != 0 {
            return Err(Error::InvalidSchedule);
        }
        if channels
            .iter()
            .any(|c| !(FIRST_CHANNEL..=LAST_CHANNEL).contains(c))
        {
            return Err(Error::InvalidSchedule);
        }
        let channels = Vec::from_slice(channels).map_err(|_| Error::InvalidSchedule)?;
        Ok(Self {
            channels,
            group_size,
            repetitions,
        })
    }

    pub fn channels(&self) -> &[u8] {
        &self.channels
    }

    pub fn group_size(&self) -> usize {
        self.group_size as usize
    }

    pub fn repetitions(&self) -> u8 {
        self.repetitions
    }

    /// Number of channel groups
    pub fn group_count(&self) -> usize {
        self.channels.len() / self.group_size()
    }
}

/// Cursor selecting the active channel group of a schedule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelGroup {
    index: usize,
}

impl ChannelGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next group, wrapping after the last one
    pub fn advance(&mut self, schedule: &TxSchedule) {
        self.index = (self.index + 1) % schedule.group_count();
    }

    /// Channels of the active group
    pub fn channels<'a>(&self, schedule: &'a TxSchedule) -> &'a [u8] {
        let start = (self.index % schedule.group_count()) * schedule.group_size();
        &schedule.channels[start..start + schedule.group_size()]
    }
}

/// Send `frame` `repetitions` times over the active channel group
///
/// Stops at the first radio error.
pub fn transmit<P: Platform>(
    platform: &mut P,
    schedule: &TxSchedule,
    group: &ChannelGroup,
    frame: &[u8],
) -> Result<(), Error> {
    let channels = group.channels(schedule);
    for repetition in 0..schedule.repetitions() as usize {
        let channel = channels[repetition % channels.len()];
        platform.set_channel(channel)?;
        platform.send(channel, frame)?;
    }
    Ok(())
}

/// Send `frame` `repetitions` times on a single channel
pub fn transmit_on_channel<P: Platform>(
    platform: &mut P,
    channel: u8,
    repetitions: u8,
    frame: &[u8],
) -> Result<(), Error> {
    platform.set_channel(channel)?;
    for _ in 0..repetitions {
        platform.send(channel, frame)?;
    }
    Ok(())
}
