//! Channel request and channel configuration

use crate::pack::Pack;
use crate::utils::{ensure_length, ensure_space};
use crate::Error;

/// Lowest IEEE 802.15.4 channel in the 2.4 GHz band
pub const FIRST_CHANNEL: u8 = 11;
/// Highest IEEE 802.15.4 channel in the 2.4 GHz band
pub const LAST_CHANNEL: u8 = 26;

fn channel_to_nibble(channel: u8) -> Result<u8, Error> {
    if (FIRST_CHANNEL..=LAST_CHANNEL).contains(&channel) {
        Ok(channel - FIRST_CHANNEL)
    } else {
        Err(Error::InvalidValue)
    }
}

/// Channel request, sent by a bidirectional device searching for a sink
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRequest {
    /// Channel the device listens on after this request
    pub next_channel: u8,
    /// Channel the device listens on after the following request
    pub second_next_channel: u8,
}

impl Pack<ChannelRequest, Error> for ChannelRequest {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        ensure_space(data, 1)?;
        data[0] = channel_to_nibble(self.next_channel)?
            | channel_to_nibble(self.second_next_channel)? << 4;
        Ok(1)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        ensure_length(data, 1)?;
        Ok((
            Self {
                next_channel: (data[0] & 0x0f) + FIRST_CHANNEL,
                second_next_channel: (data[0] >> 4) + FIRST_CHANNEL,
            },
            1,
        ))
    }
}

/// Channel configuration, the reply to a channel request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelConfiguration {
    /// Operational channel of the network
    pub operational_channel: u8,
    /// Basic sink
    pub basic: bool,
}

impl Pack<ChannelConfiguration, Error> for ChannelConfiguration {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        ensure_space(data, 1)?;
        data[0] = channel_to_nibble(self.operational_channel)? | (self.basic as u8) << 4;
        Ok(1)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        ensure_length(data, 1)?;
        Ok((
            Self {
                operational_channel: (data[0] & 0x0f) + FIRST_CHANNEL,
                basic: data[0] & 0x10 != 0,
            },
            1,
        ))
    }
}

#[cfg(all(test, not(feature = "core")))]
mod tests {
    use super::*;

    #[test]
    fn channel_request() {
        let request = ChannelRequest {
            next_channel: 15,
            second_next_channel: 20,
        };
        let mut data = [0u8; 1];
        assert_eq!(request.pack(&mut data), Ok(1));
        assert_eq!(data, [0x94]);
        assert_eq!(ChannelRequest::unpack(&data), Ok((request, 1)));

        let request = ChannelRequest {
            next_channel: 27,
            second_next_channel: 11,
        };
        assert_eq!(request.pack(&mut data), Err(Error::InvalidValue));
    }

    #[test]
    fn channel_configuration() {
        let (configuration, used) = ChannelConfiguration::unpack(&[0x1e]).unwrap();
        assert_eq!(used, 1);
        assert_eq!(configuration.operational_channel, 25);
        assert!(configuration.basic);
        let mut data = [0u8; 1];
        configuration.pack(&mut data).unwrap();
        assert_eq!(data, [0x1e]);
    }
}
