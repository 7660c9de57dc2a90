//! Bridge command grammar.
//!
//! Everything the host sees is a single string per call. This module is the
//! only place that knows the string format; the rest of the crate works with
//! [`Command`] values.
//!
//! ```text
//! ns::initialise::arg
//! ns::message::<text>
//! ns::register::<id>%%%<buttons>%%%<axes>[::<id>%%%<buttons>%%%<axes>...]
//! ns::on_connect::<buttons>::<axes>::<id>
//! ns::on_disconnect::arg
//! ns::poll::<bool,bool,...>::<float,float,...>
//! ns::press::<index>::<bool>
//! ns::axis::<index>::<float>
//! ```
//!
//! The info query has its own listing format, `%%%<id>%<buttons>%<axes>`
//! repeated, see [`encode_device_info`] / [`parse_device_info`].
//!
//! Identities are free text. Wherever an identity shares a field with numbers
//! it is parsed from the right, so separators inside an identity survive as long
//! as they are not the outer field separator of that listing.
//!
//! # Limits
//! The grammar has no escaping, and identities are sent as reported. Two cases
//! therefore encode fine but cannot be decoded back:
//! - a `register` entry whose identity contains `::` (entries are joined by `::`);
//! - an info listing entry whose identity contains `%%%`, or ends in `%%` so that
//!   it runs into the next `%` and forms `%%%`.
//!
//! Decoding such a line fails with [`ProtocolError::MalformedDevice`] rather
//! than producing a wrong device. `on_connect` has no such limit because the
//! identity is its last field.

use crate::device::DeviceSummary;
use crate::error::ProtocolError;
use std::fmt::Write as _;
use std::str::FromStr;

/// Separates the fields of a command.
pub const FIELD_SEP: &str = "::";
/// Separates identity/count sub-fields in register entries, and entries in the
/// info-query listing.
pub const ENTRY_SEP: &str = "%%%";
/// Separates identity/count sub-fields in the info-query listing.
pub const INFO_FIELD_SEP: &str = "%";

/// Placeholder argument for commands that carry no payload.
const NO_ARG: &str = "arg";

/// One message sent to the host.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Handshake probe sent until the sink accepts it.
    Initialise,
    /// User-visible notice.
    Message(String),
    /// Several devices are present; lists all of them.
    Register(Vec<DeviceSummary>),
    /// A device was selected.
    Connect {
        buttons: usize,
        axes: usize,
        id: String,
    },
    /// The active device was lost.
    Disconnect,
    /// Full-state frame (snapshot emission).
    Poll { buttons: Vec<bool>, axes: Vec<f32> },
    /// One digital input changed (edge emission).
    Press { index: usize, pressed: bool },
    /// One axis changed (edge emission).
    Axis { index: usize, value: f32 },
}

impl Command {
    /// Command name as it appears in the second field.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Initialise => "initialise",
            Command::Message(_) => "message",
            Command::Register(_) => "register",
            Command::Connect { .. } => "on_connect",
            Command::Disconnect => "on_disconnect",
            Command::Poll { .. } => "poll",
            Command::Press { .. } => "press",
            Command::Axis { .. } => "axis",
        }
    }

    /// Serialize under `namespace`.
    pub fn encode(&self, namespace: &str) -> String {
        let mut out = String::with_capacity(32);
        out.push_str(namespace);
        out.push_str(FIELD_SEP);
        out.push_str(self.name());
        out.push_str(FIELD_SEP);

        // Writing into a String cannot fail.
        let _ = match self {
            Command::Initialise | Command::Disconnect => write!(out, "{NO_ARG}"),
            Command::Message(text) => write!(out, "{text}"),
            Command::Register(devices) => {
                let entries: Vec<String> = devices
                    .iter()
                    .map(|d| format!("{}{ENTRY_SEP}{}{ENTRY_SEP}{}", d.id, d.buttons, d.axes))
                    .collect();
                write!(out, "{}", entries.join(FIELD_SEP))
            }
            Command::Connect { buttons, axes, id } => {
                write!(out, "{buttons}{FIELD_SEP}{axes}{FIELD_SEP}{id}")
            }
            Command::Poll { buttons, axes } => write!(
                out,
                "{}{FIELD_SEP}{}",
                join_csv(buttons.iter()),
                join_csv(axes.iter())
            ),
            Command::Press { index, pressed } => write!(out, "{index}{FIELD_SEP}{pressed}"),
            Command::Axis { index, value } => write!(out, "{index}{FIELD_SEP}{value}"),
        };
        out
    }

    /// Parse a command string sent under `namespace`.
    pub fn decode(namespace: &str, line: &str) -> Result<Command, ProtocolError> {
        let mut head = line.splitn(3, FIELD_SEP);
        let ns = head.next().unwrap_or_default();
        if ns != namespace {
            return Err(ProtocolError::WrongNamespace {
                expected: namespace.to_string(),
                found: ns.to_string(),
            });
        }
        let name = head.next().unwrap_or_default();
        let rest = head.next();

        match name {
            "initialise" => Ok(Command::Initialise),
            "on_disconnect" => Ok(Command::Disconnect),
            "message" => {
                let text = rest.ok_or(ProtocolError::MissingField {
                    command: "message",
                    field: "text",
                })?;
                Ok(Command::Message(text.to_string()))
            }
            "register" => {
                let devices = rest
                    .unwrap_or_default()
                    .split(FIELD_SEP)
                    .filter(|entry| !entry.is_empty())
                    .map(|entry| parse_entry(entry, ENTRY_SEP))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Command::Register(devices))
            }
            "on_connect" => {
                let mut fields = rest.unwrap_or_default().splitn(3, FIELD_SEP);
                let buttons = required(fields.next(), "on_connect", "buttons")?;
                let axes = required(fields.next(), "on_connect", "axes")?;
                let id = required(fields.next(), "on_connect", "id")?;
                Ok(Command::Connect {
                    buttons: parse_number(buttons)?,
                    axes: parse_number(axes)?,
                    id: id.to_string(),
                })
            }
            "poll" => {
                let (buttons, axes) = rest
                    .and_then(|r| r.split_once(FIELD_SEP))
                    .ok_or(ProtocolError::MissingField {
                        command: "poll",
                        field: "axes",
                    })?;
                Ok(Command::Poll {
                    buttons: split_csv(buttons, parse_bool)?,
                    axes: split_csv(axes, parse_number)?,
                })
            }
            "press" => {
                let (index, pressed) = index_and_value(rest, "press")?;
                Ok(Command::Press {
                    index: parse_number(index)?,
                    pressed: parse_bool(pressed)?,
                })
            }
            "axis" => {
                let (index, value) = index_and_value(rest, "axis")?;
                Ok(Command::Axis {
                    index: parse_number(index)?,
                    value: parse_number(value)?,
                })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

/// Encode the info-query listing: `%%%<id>%<buttons>%<axes>` per device.
pub fn encode_device_info<'a>(devices: impl IntoIterator<Item = &'a DeviceSummary>) -> String {
    let mut out = String::new();
    for d in devices {
        let _ = write!(
            out,
            "{ENTRY_SEP}{}{INFO_FIELD_SEP}{}{INFO_FIELD_SEP}{}",
            d.id, d.buttons, d.axes
        );
    }
    out
}

/// Decode an info-query listing. An empty string is an empty listing.
pub fn parse_device_info(listing: &str) -> Result<Vec<DeviceSummary>, ProtocolError> {
    listing
        .split(ENTRY_SEP)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_entry(entry, INFO_FIELD_SEP))
        .collect()
}

/// `<id><sep><buttons><sep><axes>`, split from the right.
fn parse_entry(entry: &str, sep: &str) -> Result<DeviceSummary, ProtocolError> {
    let malformed = || ProtocolError::MalformedDevice(entry.to_string());
    let mut parts = entry.rsplitn(3, sep);
    let axes = parts.next().ok_or_else(malformed)?;
    let buttons = parts.next().ok_or_else(malformed)?;
    let id = parts.next().ok_or_else(malformed)?;
    Ok(DeviceSummary {
        id: id.to_string(),
        buttons: parse_number(buttons)?,
        axes: parse_number(axes)?,
    })
}

fn required<'a>(
    field: Option<&'a str>,
    command: &'static str,
    name: &'static str,
) -> Result<&'a str, ProtocolError> {
    field.ok_or(ProtocolError::MissingField {
        command,
        field: name,
    })
}

fn index_and_value<'a>(
    rest: Option<&'a str>,
    command: &'static str,
) -> Result<(&'a str, &'a str), ProtocolError> {
    let rest = required(rest, command, "index")?;
    rest.split_once(FIELD_SEP).ok_or(ProtocolError::MissingField {
        command,
        field: "value",
    })
}

fn parse_number<T: FromStr>(s: &str) -> Result<T, ProtocolError> {
    s.trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber(s.to_string()))
}

fn parse_bool(s: &str) -> Result<bool, ProtocolError> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ProtocolError::InvalidBool(other.to_string())),
    }
}

fn join_csv<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

fn split_csv<T>(
    s: &str,
    parse: impl Fn(&str) -> Result<T, ProtocolError>,
) -> Result<Vec<T>, ProtocolError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',').map(parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, buttons: usize, axes: usize) -> DeviceSummary {
        DeviceSummary {
            id: id.to_string(),
            buttons,
            axes,
        }
    }

    #[test]
    fn encodes_each_command() {
        let ns = "contanki";
        assert_eq!(Command::Initialise.encode(ns), "contanki::initialise::arg");
        assert_eq!(Command::Disconnect.encode(ns), "contanki::on_disconnect::arg");
        assert_eq!(
            Command::Message("No controllers detected.".into()).encode(ns),
            "contanki::message::No controllers detected."
        );
        assert_eq!(
            Command::Connect {
                buttons: 17,
                axes: 4,
                id: "Xbox 360 Controller".into()
            }
            .encode(ns),
            "contanki::on_connect::17::4::Xbox 360 Controller"
        );
        assert_eq!(
            Command::Register(vec![summary("A", 10, 4), summary("B", 16, 4)]).encode(ns),
            "contanki::register::A%%%10%%%4::B%%%16%%%4"
        );
        assert_eq!(
            Command::Poll {
                buttons: vec![true, false],
                axes: vec![0.5, -1.0, 0.0]
            }
            .encode(ns),
            "contanki::poll::true,false::0.5,-1,0"
        );
        assert_eq!(
            Command::Press {
                index: 3,
                pressed: true
            }
            .encode(ns),
            "contanki::press::3::true"
        );
        assert_eq!(
            Command::Axis {
                index: 1,
                value: -0.25
            }
            .encode(ns),
            "contanki::axis::1::-0.25"
        );
    }

    #[test]
    fn connect_identity_may_contain_field_separator() {
        let cmd = Command::decode("ns", "ns::on_connect::12::2::Pad::Mk II").unwrap();
        assert_eq!(
            cmd,
            Command::Connect {
                buttons: 12,
                axes: 2,
                id: "Pad::Mk II".into()
            }
        );
    }

    #[test]
    fn message_text_keeps_separators() {
        let cmd = Command::decode("ns", "ns::message::a::b").unwrap();
        assert_eq!(cmd, Command::Message("a::b".into()));
    }

    #[test]
    fn decodes_empty_poll_frame() {
        let cmd = Command::decode("ns", "ns::poll::::").unwrap();
        assert_eq!(
            cmd,
            Command::Poll {
                buttons: vec![],
                axes: vec![]
            }
        );
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert!(matches!(
            Command::decode("ns", "other::on_disconnect::arg"),
            Err(ProtocolError::WrongNamespace { .. })
        ));
        assert_eq!(
            Command::decode("ns", "ns::jump::1"),
            Err(ProtocolError::UnknownCommand("jump".into()))
        );
        assert_eq!(
            Command::decode("ns", "ns::press::x::true"),
            Err(ProtocolError::InvalidNumber("x".into()))
        );
        assert_eq!(
            Command::decode("ns", "ns::press::1::yes"),
            Err(ProtocolError::InvalidBool("yes".into()))
        );
        assert_eq!(
            Command::decode("ns", "ns::axis::1"),
            Err(ProtocolError::MissingField {
                command: "axis",
                field: "value"
            })
        );
    }

    #[test]
    fn register_entries_decode_in_order() {
        let cmd = Command::decode("ns", "ns::register::A%%%10%%%4::B%%%16%%%4").unwrap();
        assert_eq!(
            cmd,
            Command::Register(vec![summary("A", 10, 4), summary("B", 16, 4)])
        );
    }

    #[test]
    fn info_listing_encodes_and_parses() {
        let devices = vec![summary("Pad 50%", 17, 4), summary("Stick", 12, 3)];
        let listing = encode_device_info(&devices);
        assert_eq!(listing, "%%%Pad 50%%17%4%%%Stick%12%3");
        assert_eq!(parse_device_info(&listing).unwrap(), devices);
        assert!(parse_device_info("").unwrap().is_empty());
    }

    #[test]
    fn identities_that_collide_with_outer_separators_fail_to_decode() {
        let listing = encode_device_info(&[summary("Pad%%", 4, 2)]);
        assert_eq!(listing, "%%%Pad%%%%4%2");
        assert_eq!(
            parse_device_info(&listing),
            Err(ProtocolError::MalformedDevice("Pad".into()))
        );

        let line = Command::Register(vec![summary("A::x", 10, 4), summary("B", 16, 4)]).encode("ns");
        assert_eq!(line, "ns::register::A::x%%%10%%%4::B%%%16%%%4");
        assert_eq!(
            Command::decode("ns", &line),
            Err(ProtocolError::MalformedDevice("A".into()))
        );
    }

    #[test]
    fn info_listing_rejects_truncated_entry() {
        assert_eq!(
            parse_device_info("%%%Pad%17"),
            Err(ProtocolError::MalformedDevice("Pad%17".into()))
        );
    }
}
