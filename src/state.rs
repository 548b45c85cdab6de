//! Device lifecycle state, published on `{prefix}/{device}/$state`.

use core::fmt;
use core::str::FromStr;

/// The lifecycle state of a Homie device.
///
/// The convention does not restrict transitions: any state may follow any other,
/// and every transition is published retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// The device is connected but has not finished its announcement.
    #[default]
    Init,
    /// The device is announced and operating normally.
    Ready,
    /// The device disconnected cleanly.
    Disconnected,
    /// The device is sleeping.
    Sleeping,
    /// The device disconnected unexpectedly (usually set via last will).
    Lost,
    /// The device needs human intervention.
    Alert,
}

impl State {
    /// All states, in the order the convention lists them.
    pub const ALL: [State; 6] = [
        State::Init,
        State::Ready,
        State::Disconnected,
        State::Sleeping,
        State::Lost,
        State::Alert,
    ];

    /// The payload published on `$state`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            State::Init => "init",
            State::Ready => "ready",
            State::Disconnected => "disconnected",
            State::Sleeping => "sleeping",
            State::Lost => "lost",
            State::Alert => "alert",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `$state` payload is not one of the six known states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownState;

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown device state")
    }
}

impl core::error::Error for UnknownState {}

impl FromStr for State {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        State::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or(UnknownState)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_published_state() {
        for state in State::ALL {
            assert_eq!(state.as_str().parse::<State>(), Ok(state));
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert_eq!("Ready".parse::<State>(), Err(UnknownState));
        assert_eq!("".parse::<State>(), Err(UnknownState));
    }
}
