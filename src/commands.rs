//! Command execution.

use crate::config::{Config, OutputConfig, OutputFormat};
use crate::error::CliError;
use crate::Commands;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use rscp_protocol::{
    ContainerParser, DataElement, DataType, ElementId, Frame, FrameParser, StaticCatalog,
    TagCatalog, UnknownTag,
};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Executes a command and returns the formatted output.
pub fn execute(cmd: Commands, config: &Config) -> Result<String, CliError> {
    match cmd {
        Commands::Decode {
            hex,
            file,
            no_verify_checksum,
            lenient_magic,
            no_expand,
        } => {
            let raw = read_input(hex.as_deref(), file.as_deref())?;
            let mut config = config.clone();
            if no_verify_checksum {
                config.codec.verify_checksum = false;
            }
            if lenient_magic {
                config.codec.strict_magic = false;
            }
            if no_expand {
                config.output.expand_containers = false;
            }
            decode(&raw, &config)
        }

        Commands::Encode {
            input,
            no_checksum,
            out,
        } => {
            let value = parse_json_arg(&input)?;
            let encoded = encode(&value, config.codec.checksum && !no_checksum)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &encoded).map_err(|source| CliError::Io {
                        path: path.clone(),
                        source,
                    })?;
                    Ok(format!(
                        "{} {} bytes to {}",
                        "Wrote".green(),
                        encoded.len(),
                        path.display()
                    ))
                }
                None => Ok(hex::encode(&encoded)),
            }
        }

        Commands::Verify { hex, file } => {
            let raw = read_input(hex.as_deref(), file.as_deref())?;
            verify(&raw)
        }

        Commands::Tags { namespace } => Ok(list_tags(namespace.as_deref())),
    }
}

/// Reads frame bytes from a hex argument or a binary file.
fn read_input(hex: Option<&str>, file: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match (hex, file) {
        (_, Some(path)) => std::fs::read(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        }),
        (Some(hex), None) => parse_hex(hex),
        (None, None) => Err(CliError::MissingInput),
    }
}

/// Decodes hex text, tolerating whitespace and a `0x` prefix.
fn parse_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(cleaned.as_str());
    Ok(hex::decode(digits)?)
}

/// Parses JSON from an argument, or from a file when prefixed with `@`.
fn parse_json_arg(arg: &str) -> Result<Value, CliError> {
    if let Some(path) = arg.strip_prefix('@') {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.into(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(arg)?)
    }
}

fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ===== decode =====

fn decode(raw: &[u8], config: &Config) -> Result<String, CliError> {
    let parser = FrameParser::with_options(config.codec.parser_options());
    let frame = parser.parse(raw)?;
    if let Some(total) = Frame::wire_length(raw).filter(|total| raw.len() > *total) {
        tracing::warn!("ignoring {} byte(s) after the frame", raw.len() - total);
    }

    Ok(match config.output.format {
        OutputFormat::Json => format_json(&frame_to_json(&frame, config.output.expand_containers)),
        OutputFormat::Text => render_frame(&frame, &config.output),
    })
}

fn frame_to_json(frame: &Frame, expand: bool) -> Value {
    json!({
        "timestamp": format_time(frame.timestamp()),
        "control": hex::encode(frame.control()),
        "version": frame.version(),
        "checksum": frame.checksum_enabled(),
        "elements": frame
            .elements()
            .iter()
            .map(|e| element_to_json(e, expand))
            .collect::<Vec<_>>(),
    })
}

/// Display label of a tag: its name when known, its code otherwise.
fn tag_label(id: &dyn ElementId) -> String {
    if id.data_type() == DataType::Unknown {
        id.hex()
    } else {
        id.name().to_string()
    }
}

fn element_to_json(element: &DataElement, expand: bool) -> Value {
    let id = element.id();
    let mut obj = Map::new();
    obj.insert("tag".into(), Value::from(tag_label(id.as_ref())));
    obj.insert("code".into(), Value::from(id.hex()));
    obj.insert("type".into(), Value::from(element.data_type().name()));
    obj.insert("wire_type".into(), Value::from(element.wire_type()));
    // Payloads without a typed JSON form are kept as raw hex
    match element_value_json(element, expand) {
        Some(value) => obj.insert("value".into(), value),
        None => obj.insert("payload".into(), Value::from(hex::encode(element.payload()))),
    };
    obj.insert("display".into(), Value::from(element.to_display_string()));
    Value::Object(obj)
}

/// Typed JSON rendering of the payload, if it has one.
fn element_value_json(element: &DataElement, expand: bool) -> Option<Value> {
    match element.data_type() {
        DataType::None => Some(Value::Null),
        DataType::Bool => element.value_as_boolean().map(Value::from),
        DataType::UInt64 => element.value_as_long().map(|v| Value::from(v as u64)),
        t if t.is_long_type() => element.value_as_long().map(Value::from),
        DataType::Float32 => element
            .value_as_float()
            .filter(|v| v.is_finite())
            .map(|v| Value::from(f64::from(v))),
        DataType::Double64 => element
            .value_as_double()
            .filter(|v| v.is_finite())
            .map(Value::from),
        DataType::Bitfield => element.payload().first().map(|b| Value::from(*b)),
        DataType::String => Some(Value::from(element.value_as_string())),
        DataType::Timestamp => element
            .value_as_instant()
            .map(|t| Value::from(format_time(t))),
        DataType::Container if expand => match element.try_value_as_container() {
            Ok(Some(children)) => Some(Value::Array(
                children
                    .iter()
                    .map(|c| element_to_json(c, expand))
                    .collect(),
            )),
            _ => None,
        },
        _ => None,
    }
}

fn render_frame(frame: &Frame, output: &OutputConfig) -> String {
    let mut out = format!(
        "{} {} (version {}, checksum {}, {} element(s))",
        "Frame".bold(),
        format_time(frame.timestamp()),
        frame.version(),
        if frame.checksum_enabled() { "on" } else { "off" },
        frame.elements().len()
    );
    for element in frame.elements() {
        render_element(&mut out, element, 1, output);
    }
    out
}

fn render_element(out: &mut String, element: &DataElement, depth: usize, output: &OutputConfig) {
    let pad = " ".repeat(depth * output.indent);
    let id = element.id();
    out.push_str(&format!(
        "\n{}{} {} {}",
        pad,
        tag_label(id.as_ref()).cyan(),
        format!("({})", id.hex()).dimmed(),
        element.data_type().name().dimmed()
    ));

    if element.is_error_response() {
        out.push_str(&format!(
            " = {}",
            format!("ERROR {}", hex::encode(element.payload())).red()
        ));
        return;
    }
    if element.data_type() != DataType::Container {
        out.push_str(&format!(" = {}", element.to_display_string().yellow()));
        return;
    }

    out.push_str(&format!(" [{} bytes]", element.payload().len()));
    if !output.expand_containers {
        return;
    }
    match element.try_value_as_container() {
        Ok(Some(children)) => {
            for child in &children {
                render_element(out, child, depth + 1, output);
            }
        }
        Ok(None) => {}
        Err(e) => out.push_str(&format!(
            "\n{}{}: {}",
            " ".repeat((depth + 1) * output.indent),
            "malformed container".red(),
            e
        )),
    }
}

// ===== encode =====

/// Builds a frame from JSON and returns its wire bytes.
///
/// Accepts a single element object, an array of elements, or a frame object
/// `{"timestamp": .., "checksum": .., "control": .., "elements": [..]}`.
/// Raw `control` bytes take precedence over the checksum flag.
fn encode(input: &Value, checksum: bool) -> Result<Vec<u8>, CliError> {
    let catalog = StaticCatalog::builtin();

    let mut builder = Frame::builder();
    let mut checksum = checksum;
    let mut control = None;
    let items: &[Value] = match input {
        Value::Array(items) => items,
        Value::Object(map) if map.contains_key("elements") => {
            if let Some(ts) = map.get("timestamp") {
                builder = builder.timestamp(parse_time("frame", ts)?);
            }
            if let Some(flag) = map.get("checksum").and_then(Value::as_bool) {
                checksum = flag;
            }
            if let Some(raw) = map.get("control") {
                control = Some(parse_control(raw)?);
            }
            map.get("elements")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .ok_or_else(|| CliError::invalid("frame", "\"elements\" must be an array"))?
        }
        Value::Object(_) => std::slice::from_ref(input),
        _ => {
            return Err(CliError::invalid(
                "frame",
                "expected an element, an array of elements or a frame object",
            ))
        }
    };

    let elements = items
        .iter()
        .map(|v| element_from_json(v, &catalog))
        .collect::<Result<Vec<_>, _>>()?;

    builder = builder.elements(elements);
    builder = if checksum {
        builder.with_checksum()
    } else {
        builder.without_checksum()
    };
    if let Some(control) = control {
        builder = builder.control(control);
    }
    Ok(builder.build().encode()?.to_vec())
}

fn parse_control(value: &Value) -> Result<[u8; 2], CliError> {
    let digits = value
        .as_str()
        .ok_or_else(|| CliError::invalid("frame", "\"control\" must be a hex string"))?;
    match parse_hex(digits)?.as_slice() {
        [a, b] => Ok([*a, *b]),
        _ => Err(CliError::invalid("frame", "\"control\" must be 2 bytes")),
    }
}

fn resolve_tag(tag: &str, catalog: &StaticCatalog) -> Result<Arc<dyn ElementId>, CliError> {
    if let Some(digits) = tag.strip_prefix("0x").or_else(|| tag.strip_prefix("0X")) {
        let code =
            u32::from_str_radix(digits, 16).map_err(|_| CliError::UnknownTag(tag.to_string()))?;
        return Ok(catalog.resolve(code));
    }
    catalog
        .by_name(&tag.to_uppercase())
        .ok_or_else(|| CliError::UnknownTag(tag.to_string()))
}

fn element_from_json(value: &Value, catalog: &StaticCatalog) -> Result<DataElement, CliError> {
    let obj = value
        .as_object()
        .ok_or_else(|| CliError::invalid("?", "expected an object"))?;
    let tag = obj
        .get("tag")
        .and_then(Value::as_str)
        .ok_or_else(|| CliError::invalid("?", "missing \"tag\""))?;
    let id = resolve_tag(tag, catalog)?;

    // A raw wire type byte wins over the type name
    let wire_type = match obj.get("wire_type") {
        Some(v) => Some(
            int_value::<u8>(v)
                .ok_or_else(|| CliError::invalid(tag, "\"wire_type\" must be a byte"))?,
        ),
        None => None,
    };
    let data_type = match (wire_type, obj.get("type").and_then(Value::as_str)) {
        (Some(code), _) => DataType::from_code(code),
        (None, Some(name)) => DataType::from_name(name)
            .ok_or_else(|| CliError::invalid(tag, format!("unknown type '{}'", name)))?,
        (None, None) => id.data_type(),
    };

    let (wire_type, payload) = match obj.get("payload") {
        Some(raw) => {
            if wire_type.is_none() && data_type == DataType::Unknown {
                return Err(CliError::invalid(
                    tag,
                    "type unknown for this tag; pass \"type\" or \"wire_type\"",
                ));
            }
            let digits = raw
                .as_str()
                .ok_or_else(|| CliError::invalid(tag, "\"payload\" must be a hex string"))?;
            (
                wire_type.unwrap_or(data_type.code()),
                Bytes::from(parse_hex(digits)?),
            )
        }
        None => {
            let value = obj.get("value").unwrap_or(&Value::Null);
            let typed = typed_element(tag, data_type, value, catalog)?;
            (
                wire_type.unwrap_or(typed.wire_type()),
                typed.payload().clone(),
            )
        }
    };
    Ok(DataElement::from_parts(
        id,
        wire_type,
        payload,
        ContainerParser::default(),
    ))
}

fn int_value<T: TryFrom<i64>>(value: &Value) -> Option<T> {
    value.as_i64().and_then(|v| T::try_from(v).ok())
}

fn parse_time(tag: &str, value: &Value) -> Result<DateTime<Utc>, CliError> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| CliError::invalid(tag, format!("invalid timestamp '{}': {}", s, e))),
        Value::Number(_) => value
            .as_i64()
            .and_then(|s| DateTime::from_timestamp(s, 0))
            .ok_or_else(|| CliError::invalid(tag, "timestamp out of range")),
        _ => Err(CliError::invalid(
            tag,
            "expected RFC 3339 string or epoch seconds",
        )),
    }
}

/// Encodes `value` as `data_type`. The tag identity is attached by the caller.
fn typed_element(
    tag: &str,
    data_type: DataType,
    value: &Value,
    catalog: &StaticCatalog,
) -> Result<DataElement, CliError> {
    let id = UnknownTag::new(0);
    let bad = |expected: &str| {
        CliError::invalid(tag, format!("expected {} value for {}", expected, data_type))
    };

    let element = match data_type {
        DataType::None => DataElement::none(id),
        DataType::Bool => DataElement::bool(id, value.as_bool().ok_or_else(|| bad("boolean"))?),
        DataType::Char8 => DataElement::char8(id, int_value(value).ok_or_else(|| bad("i8"))?),
        DataType::UChar8 => DataElement::uchar8(id, int_value(value).ok_or_else(|| bad("u8"))?),
        DataType::Int16 => DataElement::int16(id, int_value(value).ok_or_else(|| bad("i16"))?),
        DataType::UInt16 => {
            DataElement::uint16(id, int_value(value).ok_or_else(|| bad("u16"))?)
        }
        DataType::Int32 => DataElement::int32(id, int_value(value).ok_or_else(|| bad("i32"))?),
        DataType::UInt32 => {
            DataElement::uint32(id, int_value(value).ok_or_else(|| bad("u32"))?)
        }
        DataType::Int64 => DataElement::int64(id, value.as_i64().ok_or_else(|| bad("i64"))?),
        DataType::UInt64 => DataElement::uint64(id, value.as_u64().ok_or_else(|| bad("u64"))?),
        DataType::Float32 => {
            DataElement::float32(id, value.as_f64().ok_or_else(|| bad("number"))? as f32)
        }
        DataType::Double64 => {
            DataElement::double64(id, value.as_f64().ok_or_else(|| bad("number"))?)
        }
        DataType::Bitfield => {
            DataElement::bitfield(id, int_value(value).ok_or_else(|| bad("u8"))?)
        }
        DataType::String => DataElement::string(id, value.as_str().ok_or_else(|| bad("string"))?),
        DataType::ByteArray => {
            let digits = value.as_str().ok_or_else(|| bad("hex string"))?;
            DataElement::bytearray(id, parse_hex(digits)?)
        }
        DataType::Timestamp => DataElement::timestamp(id, parse_time(tag, value)?),
        DataType::Container => {
            let children = value
                .as_array()
                .ok_or_else(|| bad("array"))?
                .iter()
                .map(|child| element_from_json(child, catalog))
                .collect::<Result<Vec<_>, _>>()?;
            DataElement::container(id, &children)?
        }
        DataType::Error => match value {
            Value::String(digits) => DataElement::new(id, DataType::Error, parse_hex(digits)?),
            _ => DataElement::error(id, int_value(value).ok_or_else(|| bad("i32"))?),
        },
        DataType::Unknown => {
            return Err(CliError::invalid(
                tag,
                "type unknown for this tag; pass \"type\"",
            ))
        }
    };
    Ok(element)
}

// ===== verify / tags =====

fn verify(raw: &[u8]) -> Result<String, CliError> {
    if Frame::verify_checksum(raw)? {
        Ok(format!("{}", "Checksum OK".green()))
    } else {
        Ok(format!("{}", "Frame carries no checksum".yellow()))
    }
}

fn list_tags(namespace: Option<&str>) -> String {
    let catalog = StaticCatalog::builtin();
    let lines: Vec<_> = catalog
        .iter()
        .filter(|id| namespace.map_or(true, |ns| id.namespace().name().eq_ignore_ascii_case(ns)))
        .map(|id| {
            format!(
                "{}  {:<40} {}",
                id.hex(),
                id.name().cyan(),
                id.data_type().name().dimmed()
            )
        })
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rscp_protocol::{tags, RscpError};

    fn sample_hex() -> String {
        let frame = Frame::builder()
            .timestamp(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
            .element(DataElement::float32(tags::BAT_RSOC, 42.5))
            .element(
                DataElement::container(
                    tags::PM_DATA,
                    &[
                        DataElement::uchar8(tags::PM_INDEX, 6),
                        DataElement::double64(tags::PM_POWER_L1, -12.5),
                    ],
                )
                .unwrap(),
            )
            .build();
        hex::encode(frame.encode().unwrap())
    }

    fn json_config() -> Config {
        let mut config = Config::default();
        config.output.format = OutputFormat::Json;
        config
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0xE3DC 0011").unwrap(), vec![0xE3, 0xDC, 0x00, 0x11]);
        assert_eq!(parse_hex("e3dc\n").unwrap(), vec![0xE3, 0xDC]);
        assert!(matches!(parse_hex("e3d"), Err(CliError::Hex(_))));
    }

    #[test]
    fn test_read_input_requires_source() {
        assert!(matches!(read_input(None, None), Err(CliError::MissingInput)));
    }

    #[test]
    fn test_decode_json() {
        let raw = parse_hex(&sample_hex()).unwrap();
        let out = decode(&raw, &json_config()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["timestamp"], "2023-11-14T22:13:20Z");
        assert_eq!(value["checksum"], true);
        assert_eq!(value["elements"][0]["tag"], "BAT_RSOC");
        assert_eq!(value["elements"][0]["value"], 42.5);
        assert_eq!(value["elements"][0]["display"], "42.50");
        assert_eq!(value["elements"][1]["value"][0]["value"], 6);
        assert_eq!(value["elements"][1]["value"][1]["value"], -12.5);
    }

    #[test]
    fn test_decode_without_expansion() {
        let raw = parse_hex(&sample_hex()).unwrap();
        let mut config = json_config();
        config.output.expand_containers = false;
        let value: Value = serde_json::from_str(&decode(&raw, &config).unwrap()).unwrap();
        assert!(value["elements"][1].get("value").is_none());
        assert!(value["elements"][1]["payload"].is_string());
        assert_eq!(value["elements"][1]["wire_type"], 0x0E);
    }

    #[test]
    fn test_checksum_flag_disables_verification() {
        let mut raw = parse_hex(&sample_hex()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let hex = hex::encode(&raw);
        let decode_cmd = |no_verify_checksum| Commands::Decode {
            hex: Some(hex.clone()),
            file: None,
            no_verify_checksum,
            lenient_magic: false,
            no_expand: false,
        };

        assert!(execute(decode_cmd(false), &Config::default()).is_err());
        let out = execute(decode_cmd(true), &Config::default()).unwrap();
        assert!(out.contains("BAT_RSOC"));
    }

    #[test]
    fn test_decoded_json_keeps_raw_parts() {
        let frame = Frame::builder()
            .timestamp(DateTime::from_timestamp(1_700_000_000, 5).unwrap())
            .control([0x00, 0x21])
            .element(DataElement::from_parts(
                Arc::new(UnknownTag::new(0x7F00_0001)),
                0x42,
                Bytes::from_static(&[0x01, 0x02, 0x03]),
                ContainerParser::default(),
            ))
            .element(DataElement::float32(tags::BAT_RSOC, f32::NAN))
            .element(DataElement::double64(tags::PM_POWER_L1, f64::INFINITY))
            .element(DataElement::error(tags::EMS_POWER_PV, 6))
            .build();
        let original = hex::encode(frame.encode().unwrap());

        let raw = parse_hex(&original).unwrap();
        let value: Value = serde_json::from_str(&decode(&raw, &json_config()).unwrap()).unwrap();
        assert_eq!(value["control"], "0021");
        assert_eq!(value["elements"][0]["wire_type"], 0x42);
        assert_eq!(value["elements"][0]["payload"], "010203");
        assert!(value["elements"][1]["payload"].is_string());
        assert_eq!(value["elements"][3]["payload"], "00000006");

        let encoded = encode(&value, true).unwrap();
        assert_eq!(hex::encode(encoded), original);
    }

    #[test]
    fn test_encode_raw_payload() {
        let encoded = encode(
            &json!({"tag": "BAT_RSOC", "payload": "422a0000"}),
            false,
        )
        .unwrap();
        let frame = FrameParser::default().parse(&encoded).unwrap();
        assert_eq!(frame.float_by_tag(&tags::BAT_RSOC, &[]), 42.5);

        assert!(matches!(
            encode(&json!({"tag": "0x7F000001", "payload": "00"}), true),
            Err(CliError::InvalidElement { .. })
        ));
        assert!(matches!(
            encode(&json!({"elements": [], "control": "001122"}), true),
            Err(CliError::InvalidElement { .. })
        ));
    }

    #[test]
    fn test_decode_text() {
        let raw = parse_hex(&sample_hex()).unwrap();
        let out = decode(&raw, &Config::default()).unwrap();
        assert!(out.contains("BAT_RSOC"));
        assert!(out.contains("PM_POWER_L1"));
        assert!(out.contains("42.50"));
        assert!(out.contains("-12.50"));
    }

    #[test]
    fn test_decode_rejects_corruption() {
        let mut raw = parse_hex(&sample_hex()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let err = decode(&raw, &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Protocol(RscpError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let input = json!({
            "timestamp": "2023-11-14T22:13:20Z",
            "elements": [
                {"tag": "EMS_POWER_PV", "value": 1200},
                {"tag": "info_serial_number", "value": "S10-1234"},
                {"tag": "0x0A800010", "type": "TIMESTAMP", "value": 0},
                {"tag": "WB_EXTERN_DATA", "value": "00ff10"},
                {"tag": "PM_DATA", "value": [
                    {"tag": "PM_INDEX", "value": 0},
                    {"tag": "PM_POWER_L1", "value": 230.5}
                ]}
            ]
        });
        let encoded = encode(&input, true).unwrap();
        let frame = FrameParser::default().parse(&encoded).unwrap();

        assert!(frame.checksum_enabled());
        assert_eq!(frame.int_by_tag(&tags::EMS_POWER_PV, &[]), 1200);
        assert_eq!(frame.string_by_tag(&tags::INFO_SERIAL_NUMBER, &[]), "S10-1234");
        assert_eq!(
            frame.try_instant_by_tag(&tags::INFO_UTC_TIME, &[]),
            DateTime::from_timestamp(0, 0)
        );
        assert_eq!(
            frame.double_by_tag(&tags::PM_POWER_L1, &[&tags::PM_DATA]),
            230.5
        );
        assert_eq!(
            frame
                .data_by_tag(&tags::WB_EXTERN_DATA, &[])
                .unwrap()
                .value_as_bytes(),
            &[0x00, 0xFF, 0x10]
        );
    }

    #[test]
    fn test_decoded_json_reencodes() {
        let raw = parse_hex(&sample_hex()).unwrap();
        let value: Value = serde_json::from_str(&decode(&raw, &json_config()).unwrap()).unwrap();
        let encoded = encode(&value, true).unwrap();
        assert_eq!(hex::encode(encoded), sample_hex());
    }

    #[test]
    fn test_encode_without_checksum() {
        let encoded = encode(&json!([{"tag": "EMS_REQ_POWER_PV"}]), false).unwrap();
        assert_eq!(&encoded[2..4], &[0x00, 0x10]);
        assert_eq!(encoded.len(), 18 + 7);
    }

    #[test]
    fn test_encode_errors() {
        assert!(matches!(
            encode(&json!({"tag": "NO_SUCH_TAG"}), true),
            Err(CliError::UnknownTag(_))
        ));
        assert!(matches!(
            encode(&json!({"tag": "EMS_POWER_PV", "value": "high"}), true),
            Err(CliError::InvalidElement { .. })
        ));
        assert!(matches!(
            encode(&json!({"tag": "BAT_RSOC", "type": "FLOAT128"}), true),
            Err(CliError::InvalidElement { .. })
        ));
        // Unknown tags need an explicit type
        assert!(matches!(
            encode(&json!({"tag": "0x7F000001", "value": 1}), true),
            Err(CliError::InvalidElement { .. })
        ));
        assert!(matches!(
            encode(&json!({"tag": "EMS_RES_MAX_CHARGE_POWER", "value": 300}), true),
            Err(CliError::InvalidElement { .. })
        ));
    }

    #[test]
    fn test_encode_error_response() {
        let encoded = encode(
            &json!({"tag": "EMS_POWER_PV", "type": "ERROR", "value": 6}),
            true,
        )
        .unwrap();
        let frame = FrameParser::default().parse(&encoded).unwrap();
        assert!(frame.is_error_response_by_tag(&tags::EMS_POWER_PV, &[]));
        assert_eq!(
            frame
                .data_by_tag(&tags::EMS_POWER_PV, &[])
                .unwrap()
                .value_as_bytes(),
            &[0x00, 0x00, 0x00, 0x06]
        );
        // Error responses carry no readable code
        assert_eq!(
            frame.error_code_by_tag(&tags::EMS_POWER_PV, &[]),
            rscp_protocol::ErrorCode::Unknown
        );

        let raw = encoded.to_vec();
        let out = decode(&raw, &Config::default()).unwrap();
        assert!(out.contains("ERROR 00000006"));
    }

    #[test]
    fn test_verify() {
        let raw = parse_hex(&sample_hex()).unwrap();
        assert!(verify(&raw).unwrap().contains("Checksum OK"));

        let plain = encode(&json!([{"tag": "EMS_REQ_POWER_PV"}]), false).unwrap();
        assert!(verify(&plain).unwrap().contains("no checksum"));

        let mut corrupted = raw.clone();
        corrupted[20] ^= 0x80;
        assert!(matches!(
            verify(&corrupted),
            Err(CliError::Protocol(RscpError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn test_list_tags() {
        let all = list_tags(None);
        assert!(all.contains("BAT_RSOC"));
        assert!(all.contains("0x03800001"));

        let wb = list_tags(Some("wb"));
        assert!(wb.contains("WB_DATA"));
        assert!(!wb.contains("BAT_RSOC"));
        assert!(list_tags(Some("nope")).is_empty());
    }
}
