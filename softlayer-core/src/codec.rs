//! XML-RPC envelope encoding and decoding.
//!
//! ```text
//! <methodCall>
//!   <methodName>getObject</methodName>
//!   <params><param><value>...</value></param>...</params>
//! </methodCall>
//!
//! <methodResponse>
//!   <params><param><value>...</value></param></params>
//!   | <fault><value><struct>faultCode, faultString</struct></value></fault>
//! </methodResponse>
//! ```
//!
//! Encoding writes the document directly into a string. Decoding is a small
//! recursive descent over `quick_xml` events.

use base64::Engine;
use bytes::Bytes;
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::QName;

use crate::error::{CodecError, Fault};
use crate::value::{Struct, Value};

const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>\n";

/// A decoded `<methodCall>`.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub params: Vec<Value>,
}

/// A decoded `<methodResponse>`.
#[derive(Clone, Debug, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Fault(Fault),
}

/// Encode a `<methodCall>` document.
///
/// Fails with [`CodecError::Unencodable`] if a parameter holds a NaN or
/// infinite double.
pub fn encode_call(method: &str, params: &[Value]) -> Result<Bytes, CodecError> {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push_str("<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param)?;
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    Ok(Bytes::from(out))
}

/// Encode a successful `<methodResponse>` document.
pub fn encode_response(value: &Value) -> Result<Bytes, CodecError> {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push_str("<methodResponse><params><param>");
    write_value(&mut out, value)?;
    out.push_str("</param></params></methodResponse>");
    Ok(Bytes::from(out))
}

/// Encode a fault `<methodResponse>` document.
pub fn encode_fault(fault: &Fault) -> Result<Bytes, CodecError> {
    let mut out = String::with_capacity(256);
    out.push_str(XML_DECLARATION);
    out.push_str("<methodResponse><fault>");
    write_value(&mut out, &fault.to_value())?;
    out.push_str("</fault></methodResponse>");
    Ok(Bytes::from(out))
}

fn write_value(out: &mut String, value: &Value) -> Result<(), CodecError> {
    out.push_str("<value>");
    match value {
        Value::Nil => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str(if *b {
                "<boolean>1</boolean>"
            } else {
                "<boolean>0</boolean>"
            });
        }
        Value::Int(i) => {
            // <int> is 32-bit on the wire
            let tag = if i32::try_from(*i).is_ok() { "int" } else { "i8" };
            write_scalar(out, tag, &i.to_string());
        }
        Value::Double(d) if !d.is_finite() => {
            return Err(CodecError::Unencodable(format!("non-finite double {d}")));
        }
        Value::Double(d) => write_scalar(out, "double", &d.to_string()),
        Value::String(s) => write_scalar(out, "string", &escape(s.as_str())),
        Value::DateTime(s) => write_scalar(out, "dateTime.iso8601", &escape(s.as_str())),
        Value::Base64(bytes) => write_scalar(
            out,
            "base64",
            &base64::engine::general_purpose::STANDARD.encode(bytes),
        ),
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item)?;
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member)?;
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
    Ok(())
}

fn write_scalar(out: &mut String, tag: &str, text: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(text);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Decode a `<methodResponse>` document.
pub fn decode_response(input: &[u8]) -> Result<MethodResponse, CodecError> {
    let mut parser = Parser::new(input);
    parser.expect_start("methodResponse")?;

    let response = match parser.event()? {
        Event::Start(e) if is(e.name(), "params") => {
            let value = match parser.event()? {
                Event::Start(e) if is(e.name(), "param") => {
                    parser.expect_start("value")?;
                    let value = parser.value_body()?;
                    parser.expect_end("param")?;
                    parser.expect_end("params")?;
                    value
                }
                Event::End(e) if is(e.name(), "params") => Value::Nil,
                other => return Err(unexpected("<param>", &other)),
            };
            MethodResponse::Success(value)
        }
        Event::Empty(e) if is(e.name(), "params") => MethodResponse::Success(Value::Nil),
        Event::Start(e) if is(e.name(), "fault") => {
            parser.expect_start("value")?;
            let value = parser.value_body()?;
            parser.expect_end("fault")?;
            MethodResponse::Fault(Fault::from_value(&value)?)
        }
        other => return Err(unexpected("<params> or <fault>", &other)),
    };

    parser.expect_end("methodResponse")?;
    Ok(response)
}

/// Decode a `<methodCall>` document.
pub fn decode_call(input: &[u8]) -> Result<MethodCall, CodecError> {
    let mut parser = Parser::new(input);
    parser.expect_start("methodCall")?;
    parser.expect_start("methodName")?;
    let method = parser.text("methodName")?.trim().to_owned();

    let mut params = Vec::new();
    match parser.event()? {
        Event::Start(e) if is(e.name(), "params") => loop {
            match parser.event()? {
                Event::Start(e) if is(e.name(), "param") => {
                    parser.expect_start("value")?;
                    params.push(parser.value_body()?);
                    parser.expect_end("param")?;
                }
                Event::End(e) if is(e.name(), "params") => break,
                other => return Err(unexpected("<param> or </params>", &other)),
            }
        },
        Event::Empty(e) if is(e.name(), "params") => {}
        Event::End(e) if is(e.name(), "methodCall") => return Ok(MethodCall { method, params }),
        other => return Err(unexpected("<params>", &other)),
    }

    parser.expect_end("methodCall")?;
    Ok(MethodCall { method, params })
}

struct Parser<'i> {
    reader: Reader<&'i [u8]>,
}

impl<'i> Parser<'i> {
    fn new(input: &'i [u8]) -> Self {
        Self {
            reader: Reader::from_reader(input),
        }
    }

    /// Next event that carries content, including whitespace text.
    fn raw_event(&mut self) -> Result<Event<'i>, CodecError> {
        loop {
            match self.reader.read_event()? {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
                event => return Ok(event),
            }
        }
    }

    /// Next structural event; whitespace between elements is skipped.
    fn event(&mut self) -> Result<Event<'i>, CodecError> {
        loop {
            match self.raw_event()? {
                Event::Text(t) if is_blank(&t) => continue,
                event => return Ok(event),
            }
        }
    }

    fn expect_start(&mut self, name: &str) -> Result<(), CodecError> {
        match self.event()? {
            Event::Start(e) if is(e.name(), name) => Ok(()),
            other => Err(unexpected(&format!("<{name}>"), &other)),
        }
    }

    fn expect_end(&mut self, name: &str) -> Result<(), CodecError> {
        match self.event()? {
            Event::End(e) if is(e.name(), name) => Ok(()),
            other => Err(unexpected(&format!("</{name}>"), &other)),
        }
    }

    /// Collect the text content of an element up to its end tag.
    fn text(&mut self, name: &str) -> Result<String, CodecError> {
        let mut text = String::new();
        loop {
            match self.raw_event()? {
                Event::Text(t) => text.push_str(&unescape(&t)?),
                Event::CData(c) => text.push_str(utf8(&c)?),
                Event::End(e) if is(e.name(), name) => return Ok(text),
                other => return Err(unexpected(&format!("text or </{name}>"), &other)),
            }
        }
    }

    /// Parse the content of a `<value>` element whose start tag was consumed,
    /// including its end tag.
    fn value_body(&mut self) -> Result<Value, CodecError> {
        let mut untyped = String::new();
        loop {
            match self.raw_event()? {
                Event::Text(t) => untyped.push_str(&unescape(&t)?),
                Event::CData(c) => untyped.push_str(utf8(&c)?),
                Event::End(e) if is(e.name(), "value") => return Ok(Value::String(untyped)),
                Event::Empty(e) => {
                    let value = empty_value(&e)?;
                    self.expect_end("value")?;
                    return Ok(value);
                }
                Event::Start(e) => {
                    if !untyped.trim().is_empty() {
                        return Err(CodecError::Unexpected {
                            expected: "a single typed value".into(),
                            found: "mixed text and elements".into(),
                        });
                    }
                    let tag = tag_name(&e)?;
                    let value = self.typed_value(&tag)?;
                    self.expect_end("value")?;
                    return Ok(value);
                }
                other => return Err(unexpected("value content", &other)),
            }
        }
    }

    fn typed_value(&mut self, tag: &str) -> Result<Value, CodecError> {
        match tag {
            "int" | "i4" | "i8" => {
                let text = self.text(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Int)
                    .map_err(|_| invalid("int", text))
            }
            "boolean" => {
                let text = self.text(tag)?;
                match text.trim() {
                    "1" | "true" => Ok(Value::Bool(true)),
                    "0" | "false" => Ok(Value::Bool(false)),
                    _ => Err(invalid("boolean", text)),
                }
            }
            "double" => {
                let text = self.text(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Double)
                    .map_err(|_| invalid("double", text))
            }
            "string" => self.text(tag).map(Value::String),
            "dateTime.iso8601" => self.text(tag).map(|t| Value::DateTime(t.trim().to_owned())),
            "base64" => {
                let text = self.text(tag)?;
                decode_base64(&text)
            }
            "nil" => {
                self.text(tag)?;
                Ok(Value::Nil)
            }
            "array" => self.array(),
            "struct" => self.structure(),
            other => Err(CodecError::Unexpected {
                expected: "a value type".into(),
                found: format!("<{other}>"),
            }),
        }
    }

    fn array(&mut self) -> Result<Value, CodecError> {
        match self.event()? {
            Event::Start(e) if is(e.name(), "data") => {}
            Event::Empty(e) if is(e.name(), "data") => {
                self.expect_end("array")?;
                return Ok(Value::Array(Vec::new()));
            }
            other => return Err(unexpected("<data>", &other)),
        }

        let mut items = Vec::new();
        loop {
            match self.event()? {
                Event::Start(e) if is(e.name(), "value") => items.push(self.value_body()?),
                Event::Empty(e) if is(e.name(), "value") => items.push(Value::String(String::new())),
                Event::End(e) if is(e.name(), "data") => break,
                other => return Err(unexpected("<value> or </data>", &other)),
            }
        }

        self.expect_end("array")?;
        Ok(Value::Array(items))
    }

    fn structure(&mut self) -> Result<Value, CodecError> {
        let mut members = Struct::new();
        loop {
            match self.event()? {
                Event::Start(e) if is(e.name(), "member") => {
                    self.expect_start("name")?;
                    let name = self.text("name")?;
                    let value = match self.event()? {
                        Event::Start(e) if is(e.name(), "value") => self.value_body()?,
                        Event::Empty(e) if is(e.name(), "value") => Value::String(String::new()),
                        other => return Err(unexpected("<value>", &other)),
                    };
                    self.expect_end("member")?;
                    members.insert(name, value);
                }
                Event::End(e) if is(e.name(), "struct") => return Ok(Value::Struct(members)),
                other => return Err(unexpected("<member> or </struct>", &other)),
            }
        }
    }
}

/// Value of a self-closing type element such as `<nil/>` or `<string/>`.
fn empty_value(e: &BytesStart<'_>) -> Result<Value, CodecError> {
    match tag_name(e)?.as_str() {
        "nil" => Ok(Value::Nil),
        "string" => Ok(Value::String(String::new())),
        "base64" => Ok(Value::Base64(Vec::new())),
        "array" => Ok(Value::Array(Vec::new())),
        "struct" => Ok(Value::empty_struct()),
        "int" | "i4" | "i8" => Err(invalid("int", String::new())),
        "boolean" => Err(invalid("boolean", String::new())),
        "double" => Err(invalid("double", String::new())),
        other => Err(CodecError::Unexpected {
            expected: "a value type".into(),
            found: format!("<{other}/>"),
        }),
    }
}

fn decode_base64(text: &str) -> Result<Value, CodecError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map(Value::Base64)
        .map_err(|_| invalid("base64", text.to_owned()))
}

fn is(name: QName<'_>, expected: &str) -> bool {
    name.as_ref() == expected.as_bytes()
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn tag_name(e: &BytesStart<'_>) -> Result<String, CodecError> {
    utf8(e.name().as_ref()).map(str::to_owned)
}

fn utf8(bytes: &[u8]) -> Result<&str, CodecError> {
    std::str::from_utf8(bytes).map_err(|e| CodecError::Xml(format!("invalid UTF-8: {e}")))
}

fn unescape(text: &BytesText<'_>) -> Result<String, CodecError> {
    text.unescape()
        .map(|text| text.into_owned())
        .map_err(|e| CodecError::Xml(e.to_string()))
}

fn invalid(kind: &'static str, text: String) -> CodecError {
    CodecError::InvalidValue { kind, text }
}

fn unexpected(expected: &str, found: &Event<'_>) -> CodecError {
    let found = match found {
        Event::Start(e) => format!("<{}>", String::from_utf8_lossy(e.name().as_ref())),
        Event::End(e) => format!("</{}>", String::from_utf8_lossy(e.name().as_ref())),
        Event::Empty(e) => format!("<{}/>", String::from_utf8_lossy(e.name().as_ref())),
        Event::Text(_) | Event::CData(_) => "text".to_owned(),
        Event::Eof => "end of document".to_owned(),
        _ => "markup".to_owned(),
    };
    CodecError::Unexpected {
        expected: expected.to_owned(),
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FaultCode;

    fn response(value_xml: &str) -> Vec<u8> {
        format!(
            "<?xml version=\"1.0\"?>\n<methodResponse>\n  <params>\n    <param>\n      \
             <value>{value_xml}</value>\n    </param>\n  </params>\n</methodResponse>\n"
        )
        .into_bytes()
    }

    fn success(input: &[u8]) -> Value {
        match decode_response(input).unwrap() {
            MethodResponse::Success(value) => value,
            MethodResponse::Fault(fault) => panic!("unexpected fault: {fault}"),
        }
    }

    #[test]
    fn test_encode_call_layout() {
        let headers: Value = [(
            "headers",
            [("authenticate", Value::from("x"))].into_iter().collect::<Value>(),
        )]
        .into_iter()
        .collect();

        let body = encode_call("getObject", &[headers, Value::from(1234)]).unwrap();
        let text = std::str::from_utf8(&body).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\"?>"));
        assert!(text.contains("<methodName>getObject</methodName>"));
        assert!(text.contains(
            "<param><value><struct><member><name>headers</name><value><struct>\
             <member><name>authenticate</name><value><string>x</string></value></member>\
             </struct></value></member></struct></value></param>"
        ));
        assert!(text.contains("<param><value><int>1234</int></value></param>"));
    }

    #[test]
    fn test_encode_escapes_text() {
        let body = encode_call("a<b", &[Value::from("x & <y>")]).unwrap();
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("<methodName>a&lt;b</methodName>"));
        assert!(text.contains("<string>x &amp; &lt;y&gt;</string>"));

        let call = decode_call(&body).unwrap();
        assert_eq!(call.method, "a<b");
        assert_eq!(call.params, vec![Value::from("x & <y>")]);
    }

    #[test]
    fn test_encode_large_int_as_i8() {
        let body = encode_response(&Value::Int(1 << 40)).unwrap();
        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains("<i8>1099511627776</i8>"));
        assert_eq!(success(&body), Value::Int(1 << 40));
    }

    #[test]
    fn test_encode_rejects_non_finite_double() {
        assert!(encode_response(&Value::Double(0.5)).is_ok());

        for d in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let nested: Value = [("ratio", Value::Array(vec![Value::Double(d)]))]
                .into_iter()
                .collect();
            assert!(matches!(
                encode_call("setRatio", &[nested]),
                Err(CodecError::Unencodable(_))
            ));
            assert!(matches!(
                encode_response(&Value::Double(d)),
                Err(CodecError::Unencodable(_))
            ));
        }
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(success(&response("<int>42</int>")), Value::Int(42));
        assert_eq!(success(&response("<i4>-7</i4>")), Value::Int(-7));
        assert_eq!(success(&response("<boolean>1</boolean>")), Value::Bool(true));
        assert_eq!(success(&response("<double>2.5</double>")), Value::Double(2.5));
        assert_eq!(success(&response("<nil/>")), Value::Nil);
        assert_eq!(
            success(&response("<dateTime.iso8601>2013-01-01T00:00:00-06:00</dateTime.iso8601>")),
            Value::DateTime("2013-01-01T00:00:00-06:00".into())
        );
        assert_eq!(
            success(&response("<base64>aGVs\n  bG8=</base64>")),
            Value::Base64(b"hello".to_vec())
        );
    }

    #[test]
    fn test_decode_untyped_value_is_string() {
        assert_eq!(success(&response("plain text")), Value::String("plain text".into()));
        assert_eq!(success(&response("")), Value::String(String::new()));
        assert_eq!(success(&response("<string/>")), Value::String(String::new()));
        assert_eq!(success(&response("<string>  padded </string>")), Value::String("  padded ".into()));
    }

    #[test]
    fn test_decode_nested_struct_and_array() {
        let xml = "<array><data>\n\
                   <value><struct>\n\
                     <member><name>id</name><value><int>1</int></value></member>\n\
                     <member><name>hostname</name><value>web1</value></member>\n\
                     <member><name>tags</name><value><array><data/></array></value></member>\n\
                   </struct></value>\n\
                   <value><struct/></value>\n\
                   </data></array>";

        let value = success(&response(xml));
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("id"), Some(&Value::Int(1)));
        assert_eq!(items[0].get("hostname").and_then(Value::as_str), Some("web1"));
        assert_eq!(items[0].get("tags"), Some(&Value::Array(vec![])));
        assert_eq!(items[1], Value::empty_struct());
    }

    #[test]
    fn test_decode_fault() {
        let body = encode_fault(&Fault::new(
            "SoftLayer_Exception_InvalidLegacyToken",
            "Invalid API token.",
        ))
        .unwrap();

        match decode_response(&body).unwrap() {
            MethodResponse::Fault(fault) => {
                assert_eq!(
                    fault.code,
                    FaultCode::Text("SoftLayer_Exception_InvalidLegacyToken".into())
                );
                assert_eq!(fault.message, "Invalid API token.");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_empty_params() {
        let body = b"<methodResponse><params/></methodResponse>";
        assert_eq!(success(body), Value::Nil);
    }

    #[test]
    fn test_decode_call_without_params() {
        let call =
            decode_call(b"<methodCall><methodName> getObject </methodName></methodCall>").unwrap();
        assert_eq!(call.method, "getObject");
        assert!(call.params.is_empty());
    }

    #[test]
    fn test_decode_rejects_invalid_documents() {
        assert!(matches!(
            decode_response(b"<html><body>502 Bad Gateway</body></html>"),
            Err(CodecError::Unexpected { .. })
        ));
        assert!(matches!(
            decode_response(&response("<int>forty</int>")),
            Err(CodecError::InvalidValue { kind: "int", .. })
        ));
        assert!(matches!(
            decode_response(&response("<widget>1</widget>")),
            Err(CodecError::Unexpected { .. })
        ));
        assert!(decode_response(b"<methodResponse><params>").is_err());
    }
}
