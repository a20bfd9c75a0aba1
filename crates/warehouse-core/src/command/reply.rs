//! Wire-visible replies for dispatch outcomes.

use super::dispatch::{Applied, Outcome};
use super::Channel;
use crate::config::ProtocolConfig;

impl Outcome {
    /// Text sent back to the client on `channel`, if any.
    ///
    /// Stream commands never get a reply. Datagram replies carry no trailing
    /// newline; console replies are single lines without one either.
    pub fn reply(&self, channel: Channel) -> Option<String> {
        match channel {
            Channel::Stream => None,
            Channel::Datagram => Some(self.datagram_reply()),
            Channel::Console => Some(self.console_reply()),
        }
    }

    fn datagram_reply(&self) -> String {
        match self.delivered() {
            Some(0) => ProtocolConfig::REPLY_FAILED.to_string(),
            Some(n) => format!("{} {}", ProtocolConfig::REPLY_OK, n),
            None => ProtocolConfig::REPLY_INVALID.to_string(),
        }
    }

    fn console_reply(&self) -> String {
        match self {
            Outcome::Applied(Applied::Capacity { drink, count }) => {
                format!("You can make {} {}(s)", count, drink)
            }
            _ => ProtocolConfig::REPLY_UNKNOWN_CONSOLE.to_string(),
        }
    }
}
