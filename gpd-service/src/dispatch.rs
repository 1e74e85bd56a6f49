//! Application commands

use gpd_crypto::CryptoBackend;
use gpd_data::{
    cluster_library::commands::{AttributeReport, AttributeRequest, ReadAttributesResponse},
    command::CommandIdentifier,
    commands::{Move, MoveColor, Step, StepColor},
    frame::MAX_FRAME_SIZE,
    pack::Pack,
};

use crate::{CommissioningMode, CommissioningState, Error, GpdContext, Platform, Target};

/// Command the application asks the device to send
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command<'a> {
    /// Command without payload
    Plain(CommandIdentifier),
    /// Level, hue or saturation move
    Move(CommandIdentifier, Move),
    /// Level, hue or saturation step
    Step(CommandIdentifier, Step),
    /// Color move
    MoveColor(MoveColor),
    /// Color step
    StepColor(StepColor),
    /// 8-bit vector press or release
    Vector(CommandIdentifier, u8),
    /// Attribute report
    AttributeReport(AttributeReport<'a>),
    /// Attribute request
    AttributeRequest(AttributeRequest<'a>),
    /// Read attributes response
    ReadAttributesResponse(ReadAttributesResponse<'a>),
}

fn is_plain(command: CommandIdentifier) -> bool {
    use CommandIdentifier::*;
    matches!(
        command,
        Identify
            | RecallScene0
            | RecallScene1
            | RecallScene2
            | RecallScene3
            | RecallScene4
            | RecallScene5
            | RecallScene6
            | RecallScene7
            | StoreScene0
            | StoreScene1
            | StoreScene2
            | StoreScene3
            | StoreScene4
            | StoreScene5
            | StoreScene6
            | StoreScene7
            | Off
            | On
            | Toggle
            | Release
            | LevelControlStop
            | MoveHueStop
            | MoveSaturationStop
            | LockDoor
            | UnlockDoor
            | Press1Of1
            | Release1Of1
            | Press1Of2
            | Release1Of2
            | Press2Of2
            | Release2Of2
            | ShortPress1Of1
            | ShortPress1Of2
            | ShortPress2Of2
    )
}

fn is_move(command: CommandIdentifier) -> bool {
    use CommandIdentifier::*;
    matches!(
        command,
        MoveUp
            | MoveDown
            | MoveUpWithOnOff
            | MoveDownWithOnOff
            | MoveHueUp
            | MoveHueDown
            | MoveSaturationUp
            | MoveSaturationDown
    )
}

fn is_step(command: CommandIdentifier) -> bool {
    use CommandIdentifier::*;
    matches!(
        command,
        StepUp
            | StepDown
            | StepUpWithOnOff
            | StepDownWithOnOff
            | StepHueUp
            | StepHueDown
            | StepSaturationUp
            | StepSaturationDown
    )
}

impl<'a> Command<'a> {
    pub fn identify() -> Self {
        Command::Plain(CommandIdentifier::Identify)
    }

    pub fn on() -> Self {
        Command::Plain(CommandIdentifier::On)
    }

    pub fn off() -> Self {
        Command::Plain(CommandIdentifier::Off)
    }

    pub fn toggle() -> Self {
        Command::Plain(CommandIdentifier::Toggle)
    }

    pub fn release() -> Self {
        Command::Plain(CommandIdentifier::Release)
    }

    /// Recall scene 0 to 7
    pub fn recall_scene(scene: u8) -> Option<Self> {
        CommandIdentifier::recall_scene(scene).map(Command::Plain)
    }

    /// Store scene 0 to 7
    pub fn store_scene(scene: u8) -> Option<Self> {
        CommandIdentifier::store_scene(scene).map(Command::Plain)
    }

    pub fn move_up(rate: Option<u8>) -> Self {
        Command::Move(CommandIdentifier::MoveUp, Move { rate })
    }

    pub fn move_down(rate: Option<u8>) -> Self {
        Command::Move(CommandIdentifier::MoveDown, Move { rate })
    }

    pub fn move_up_with_on_off(rate: Option<u8>) -> Self {
        Command::Move(CommandIdentifier::MoveUpWithOnOff, Move { rate })
    }

    pub fn move_down_with_on_off(rate: Option<u8>) -> Self {
        Command::Move(CommandIdentifier::MoveDownWithOnOff, Move { rate })
    }

    pub fn step_up(step_size: u8, transition_time: Option<u16>) -> Self {
        Command::Step(
            CommandIdentifier::StepUp,
            Step {
                step_size,
                transition_time,
            },
        )
    }

    pub fn step_down(step_size: u8, transition_time: Option<u16>) -> Self {
        Command::Step(
            CommandIdentifier::StepDown,
            Step {
                step_size,
                transition_time,
            },
        )
    }

    pub fn step_up_with_on_off(step_size: u8, transition_time: Option<u16>) -> Self {
        Command::Step(
            CommandIdentifier::StepUpWithOnOff,
            Step {
                step_size,
                transition_time,
            },
        )
    }

    pub fn step_down_with_on_off(step_size: u8, transition_time: Option<u16>) -> Self {
        Command::Step(
            CommandIdentifier::StepDownWithOnOff,
            Step {
                step_size,
                transition_time,
            },
        )
    }

    pub fn level_control_stop() -> Self {
        Command::Plain(CommandIdentifier::LevelControlStop)
    }

    pub fn move_color(rate_x: i16, rate_y: i16) -> Self {
        Command::MoveColor(MoveColor { rate_x, rate_y })
    }

    pub fn step_color(step_x: i16, step_y: i16, transition_time: Option<u16>) -> Self {
        Command::StepColor(StepColor {
            step_x,
            step_y,
            transition_time,
        })
    }

    pub fn lock_door() -> Self {
        Command::Plain(CommandIdentifier::LockDoor)
    }

    pub fn unlock_door() -> Self {
        Command::Plain(CommandIdentifier::UnlockDoor)
    }

    pub fn press_vector(buttons: u8) -> Self {
        Command::Vector(CommandIdentifier::Press8BitVector, buttons)
    }

    pub fn release_vector(buttons: u8) -> Self {
        Command::Vector(CommandIdentifier::Release8BitVector, buttons)
    }

    /// Command identifier on the air
    ///
    /// Fails when the identifier does not match the payload kind.
    pub fn identifier(&self) -> Result<CommandIdentifier, Error> {
        let (identifier, valid) = match self {
            Command::Plain(id) => (*id, is_plain(*id)),
            Command::Move(id, _) => (*id, is_move(*id)),
            Command::Step(id, _) => (*id, is_step(*id)),
            Command::MoveColor(_) => (CommandIdentifier::MoveColor, true),
            Command::StepColor(_) => (CommandIdentifier::StepColor, true),
            Command::Vector(id, _) => (
                *id,
                *id == CommandIdentifier::Press8BitVector
                    || *id == CommandIdentifier::Release8BitVector,
            ),
            Command::AttributeReport(report) => (report.command()?, true),
            Command::AttributeRequest(_) => (CommandIdentifier::RequestAttributes, true),
            Command::ReadAttributesResponse(_) => {
                (CommandIdentifier::ReadAttributesResponse, true)
            }
        };
        if valid {
            Ok(identifier)
        } else {
            Err(Error::DataError(gpd_data::Error::InvalidValue))
        }
    }

    /// Serialise the payload
    pub fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let used = match self {
            Command::Plain(_) => 0,
            Command::Move(_, payload) => payload.pack(data)?,
            Command::Step(_, payload) => payload.pack(data)?,
            Command::MoveColor(payload) => payload.pack(data)?,
            Command::StepColor(payload) => payload.pack(data)?,
            Command::Vector(_, buttons) => {
                let byte = data
                    .first_mut()
                    .ok_or(Error::DataError(gpd_data::Error::NotEnoughSpace))?;
                *byte = *buttons;
                1
            }
            Command::AttributeReport(report) => report.pack(data)?,
            Command::AttributeRequest(request) => request.pack(data)?,
            Command::ReadAttributesResponse(response) => response.pack(data)?,
        };
        Ok(used)
    }
}

impl<P, CB> GpdContext<P, CB>
where
    P: Platform,
    CB: CryptoBackend,
{
    /// Send an application command
    ///
    /// Bidirectional devices send on the operational channel and may keep
    /// the receiver on afterwards with `rx_after_tx`, unidirectional devices
    /// send over the active channel group. A unidirectional device that is
    /// commissioning becomes commissioned by the first command sent.
    pub fn send_command(&mut self, command: &Command, rx_after_tx: bool) -> Result<(), Error> {
        let in_progress = self.mode == CommissioningMode::Unidirectional
            && self.state == CommissioningState::CommissioningInProgress;
        if self.state != CommissioningState::Commissioned && !in_progress {
            log::warn!("< {:?} dropped, not commissioned", command.identifier());
            return Err(Error::NotCommissioned);
        }
        let identifier = command.identifier()?;
        let mut data = [0u8; MAX_FRAME_SIZE];
        let used = command.pack(&mut data)?;
        let (rx_after_tx, target) = match (self.mode, self.operational_channel) {
            (CommissioningMode::Bidirectional, Some(channel)) => {
                (rx_after_tx, Target::Channel(channel))
            }
            _ => {
                if rx_after_tx {
                    log::warn!("RX after TX ignored by unidirectional devices");
                }
                (false, Target::Schedule)
            }
        };
        let security_level = self.security.security_level();
        self.send_frame(identifier, &data[..used], security_level, rx_after_tx, target)?;
        if in_progress {
            log::info!("Commissioned");
            self.state = CommissioningState::Commissioned;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_identifiers() {
        assert_eq!(Command::on().identifier(), Ok(CommandIdentifier::On));
        assert_eq!(
            Command::recall_scene(3).unwrap().identifier(),
            Ok(CommandIdentifier::RecallScene3)
        );
        assert_eq!(Command::store_scene(8), None);
        assert_eq!(
            Command::step_down_with_on_off(1, None).identifier(),
            Ok(CommandIdentifier::StepDownWithOnOff)
        );
        assert_eq!(
            Command::Plain(CommandIdentifier::Commissioning).identifier(),
            Err(Error::DataError(gpd_data::Error::InvalidValue))
        );
        assert_eq!(
            Command::Move(CommandIdentifier::StepUp, Move { rate: None }).identifier(),
            Err(Error::DataError(gpd_data::Error::InvalidValue))
        );
        assert_eq!(
            Command::Plain(CommandIdentifier::ReadAttributes).identifier(),
            Err(Error::DataError(gpd_data::Error::InvalidValue))
        );
    }

    #[test]
    fn command_payloads() {
        let mut data = [0u8; 16];
        assert_eq!(Command::toggle().pack(&mut data), Ok(0));
        assert_eq!(Command::move_up(None).pack(&mut data), Ok(0));
        assert_eq!(Command::move_up(Some(0x40)).pack(&mut data), Ok(1));
        assert_eq!(data[0], 0x40);
        assert_eq!(Command::step_up(0x10, Some(0x0102)).pack(&mut data), Ok(3));
        assert_eq!(data[..3], [0x10, 0x02, 0x01]);
        assert_eq!(Command::move_color(-1, 2).pack(&mut data), Ok(4));
        assert_eq!(data[..4], [0xff, 0xff, 0x02, 0x00]);
        assert_eq!(Command::press_vector(0b101).pack(&mut data), Ok(1));
        assert_eq!(data[0], 0b101);
    }

    #[test]
    fn send_after_commissioning_step() {
        use crate::testing::{context, switch_config};
        use crate::TxSchedule;

        let mut gpd = context(switch_config(), TxSchedule::new(&[25], 1, 1).unwrap());
        gpd.step().unwrap();
        gpd.platform_mut().sent.clear();
        gpd.send_command(&Command::step_up(0x10, None), true).unwrap();
        // RX after TX is dropped, no extended frame control is needed
        assert_eq!(
            gpd.platform().sent,
            [(25, vec![0x0c, 0x78, 0x56, 0x34, 0x12, 0x32, 0x10])]
        );
        assert_eq!(
            gpd.send_command(&Command::Plain(CommandIdentifier::Success), false),
            Err(Error::DataError(gpd_data::Error::InvalidValue))
        );
        assert_eq!(gpd.platform().sent.len(), 1);
    }
}
