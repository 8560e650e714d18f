//! MessagePack framing for collector traffic.

use std::io;

use rmp_serde::Serializer;
use serde::Serialize;

use crate::event::{LogEvent, Metadata};

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireFrame<'a> {
    Auth {
        token: &'a str,
        #[serde(rename = "appKey")]
        app_key: &'a str,
    },
    Log(WireEvent<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent<'a> {
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'a str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    app_key: Option<&'a str>,
    /// Milliseconds since the Unix epoch, present only for buffered events.
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ns: Option<u32>,
}

impl<'a> From<&'a LogEvent> for WireEvent<'a> {
    fn from(event: &'a LogEvent) -> Self {
        Self {
            level: event.level().as_str(),
            scope: event.scope(),
            message: event.message(),
            meta: event.metadata(),
            app_key: event.app_key(),
            timestamp: event.timestamp().map(|ts| ts.timestamp_millis()),
            ns: event.sequence_nanos(),
        }
    }
}

fn encode(frame: &WireFrame<'_>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    frame
        .serialize(&mut Serializer::new(&mut buf).with_struct_map())
        .map_err(io::Error::other)?;
    Ok(buf)
}

/// Serialise an event into a MessagePack payload.
pub fn serialise_event(event: &LogEvent) -> io::Result<Vec<u8>> {
    encode(&WireFrame::Log(WireEvent::from(event)))
}

/// Serialise the authentication payload sent after each connect.
pub fn serialise_auth(token: &str, app_key: &str) -> io::Result<Vec<u8>> {
    encode(&WireFrame::Auth { token, app_key })
}

/// Frame the payload with a big-endian length prefix.
pub fn frame_payload(payload: &[u8], max_size: usize) -> Option<Vec<u8>> {
    if payload.len() > max_size {
        return None;
    }
    let len = u32::try_from(payload.len()).ok()?;
    let capacity = payload.len().checked_add(4)?;
    let mut framed = Vec::with_capacity(capacity);
    framed.extend(len.to_be_bytes());
    framed.extend_from_slice(payload);
    Some(framed)
}
