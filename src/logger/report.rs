//! Per-channel results of a single dispatch.

use crate::{channel::Delivery, error::ChannelError};

/// Result of handing one event to one channel.
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: String,
    pub result: Result<Delivery, ChannelError>,
}

/// Outcomes of a dispatch, in channel registration order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    pub(crate) fn push(&mut self, channel: &str, result: Result<Delivery, ChannelError>) {
        self.outcomes.push(ChannelOutcome {
            channel: channel.to_owned(),
            result,
        });
    }

    pub fn outcomes(&self) -> &[ChannelOutcome] {
        &self.outcomes
    }

    /// Result reported by the first channel called `name`.
    pub fn outcome(&self, name: &str) -> Option<&Result<Delivery, ChannelError>> {
        self.outcomes
            .iter()
            .find(|o| o.channel == name)
            .map(|o| &o.result)
    }

    /// Channels that failed, with their errors.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &ChannelError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(err) => Some((o.channel.as_str(), err)),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }
}
