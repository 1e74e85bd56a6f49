//! # Green Power command identifiers

extended_enum!(
    /// GPDF command identifier, the first octet of the application payload
    CommandIdentifier, u8,
    /// Identify
    Identify => 0x00,
    /// Recall scene 0
    RecallScene0 => 0x10,
    /// Recall scene 1
    RecallScene1 => 0x11,
    /// Recall scene 2
    RecallScene2 => 0x12,
    /// Recall scene 3
    RecallScene3 => 0x13,
    /// Recall scene 4
    RecallScene4 => 0x14,
    /// Recall scene 5
    RecallScene5 => 0x15,
    /// Recall scene 6
    RecallScene6 => 0x16,
    /// Recall scene 7
    RecallScene7 => 0x17,
    /// Store scene 0
    StoreScene0 => 0x18,
    /// Store scene 1
    StoreScene1 => 0x19,
    /// Store scene 2
    StoreScene2 => 0x1a,
    /// Store scene 3
    StoreScene3 => 0x1b,
    /// Store scene 4
    StoreScene4 => 0x1c,
    /// Store scene 5
    StoreScene5 => 0x1d,
    /// Store scene 6
    StoreScene6 => 0x1e,
    /// Store scene 7
    StoreScene7 => 0x1f,
    /// Off
    Off => 0x20,
    /// On
    On => 0x21,
    /// Toggle
    Toggle => 0x22,
    /// Release
    Release => 0x23,
    /// Move up
    MoveUp => 0x30,
    /// Move down
    MoveDown => 0x31,
    /// Step up
    StepUp => 0x32,
    /// Step down
    StepDown => 0x33,
    /// Level control stop
    LevelControlStop => 0x34,
    /// Move up with on/off
    MoveUpWithOnOff => 0x35,
    /// Move down with on/off
    MoveDownWithOnOff => 0x36,
    /// Step up with on/off
    StepUpWithOnOff => 0x37,
    /// Step down with on/off
    StepDownWithOnOff => 0x38,
    /// Move hue stop
    MoveHueStop => 0x40,
    /// Move hue up
    MoveHueUp => 0x41,
    /// Move hue down
    MoveHueDown => 0x42,
    /// Step hue up
    StepHueUp => 0x43,
    /// Step hue down
    StepHueDown => 0x44,
    /// Move saturation stop
    MoveSaturationStop => 0x45,
    /// Move saturation up
    MoveSaturationUp => 0x46,
    /// Move saturation down
    MoveSaturationDown => 0x47,
    /// Step saturation up
    StepSaturationUp => 0x48,
    /// Step saturation down
    StepSaturationDown => 0x49,
    /// Move color
    MoveColor => 0x4a,
    /// Step color
    StepColor => 0x4b,
    /// Lock door
    LockDoor => 0x50,
    /// Unlock door
    UnlockDoor => 0x51,
    /// Press 1 of 1
    Press1Of1 => 0x60,
    /// Release 1 of 1
    Release1Of1 => 0x61,
    /// Press 1 of 2
    Press1Of2 => 0x62,
    /// Release 1 of 2
    Release1Of2 => 0x63,
    /// Press 2 of 2
    Press2Of2 => 0x64,
    /// Release 2 of 2
    Release2Of2 => 0x65,
    /// Short press 1 of 1
    ShortPress1Of1 => 0x66,
    /// Short press 1 of 2
    ShortPress1Of2 => 0x67,
    /// Short press 2 of 2
    ShortPress2Of2 => 0x68,
    /// 8-bit vector press
    Press8BitVector => 0x69,
    /// 8-bit vector release
    Release8BitVector => 0x6a,
    /// Attribute reporting
    AttributeReporting => 0xa0,
    /// Manufacturer specific attribute reporting
    ManufacturerAttributeReporting => 0xa1,
    /// Multi-cluster reporting
    MultiClusterReporting => 0xa2,
    /// Manufacturer specific multi-cluster reporting
    ManufacturerMultiClusterReporting => 0xa3,
    /// Request attributes
    RequestAttributes => 0xa4,
    /// Read attributes response
    ReadAttributesResponse => 0xa5,
    /// ZCL tunneling
    ZclTunneling => 0xa6,
    /// Compact attribute reporting
    CompactAttributeReporting => 0xa8,
    /// Any GPD sensor command
    AnySensorCommand => 0xaf,
    /// Commissioning
    Commissioning => 0xe0,
    /// Decommissioning
    Decommissioning => 0xe1,
    /// Success
    Success => 0xe2,
    /// Channel request
    ChannelRequest => 0xe3,
    /// Application description
    ApplicationDescription => 0xe4,
    /// Commissioning reply, sent to the device
    CommissioningReply => 0xf0,
    /// Write attributes, sent to the device
    WriteAttributes => 0xf1,
    /// Read attributes, sent to the device
    ReadAttributes => 0xf2,
    /// Channel configuration, sent to the device
    ChannelConfiguration => 0xf3,
);

impl CommandIdentifier {
    /// Recall scene `scene`, valid scenes are 0 to 7
    pub fn recall_scene(scene: u8) -> Option<Self> {
        if scene < 8 {
            Self::try_from(0x10 + scene).ok()
        } else {
            None
        }
    }

    /// Store scene `scene`, valid scenes are 0 to 7
    pub fn store_scene(scene: u8) -> Option<Self> {
        if scene < 8 {
            Self::try_from(0x18 + scene).ok()
        } else {
            None
        }
    }

    /// Commands in the range 0xf0 to 0xff are sent from a sink to the device
    pub fn is_to_device(self) -> bool {
        u8::from(self) >= 0xf0
    }
}

#[cfg(all(test, not(feature = "core")))]
mod tests {
    use super::*;

    #[test]
    fn scenes() {
        assert_eq!(
            CommandIdentifier::recall_scene(0),
            Some(CommandIdentifier::RecallScene0)
        );
        assert_eq!(
            CommandIdentifier::recall_scene(7),
            Some(CommandIdentifier::RecallScene7)
        );
        assert_eq!(CommandIdentifier::recall_scene(8), None);
        assert_eq!(
            CommandIdentifier::store_scene(3),
            Some(CommandIdentifier::StoreScene3)
        );
        assert_eq!(CommandIdentifier::store_scene(9), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(u8::from(CommandIdentifier::Toggle), 0x22);
        assert_eq!(
            CommandIdentifier::try_from(0xf3),
            Ok(CommandIdentifier::ChannelConfiguration)
        );
        assert_eq!(
            CommandIdentifier::try_from(0x7f),
            Err(crate::Error::InvalidValue)
        );
        assert!(CommandIdentifier::CommissioningReply.is_to_device());
        assert!(!CommandIdentifier::Commissioning.is_to_device());
    }
}
