//! # Green Power command payloads
//!
//! Payloads follow the command identifier in the GPDF. Attribute commands
//! live in the cluster library module.

pub mod channel;
pub mod color;
pub mod commissioning;
pub mod level;

pub use channel::{ChannelConfiguration, ChannelRequest};
pub use color::{MoveColor, StepColor};
pub use commissioning::{Commissioning, CommissioningReply};
pub use level::{Move, Step};
