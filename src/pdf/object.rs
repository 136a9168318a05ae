//! Low-level PDF syntax: the [`Object`] value type and its serialization
//! (spec §4.I), grounded on the teacher's `pdf::object`/`pdf::syntax`
//! modules but with owned storage — this pipeline assembles objects
//! dynamically from a traversed `LayoutResult` rather than from `'static`
//! literals, so the teacher's borrowed `Object<'a>` doesn't fit.

use std::io::{self, Write};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Name(String),
    LiteralString(Vec<u8>),
    HexString(Vec<u8>),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    Reference(ObjectId),
    /// A stream object: its dictionary plus raw (uncompressed) bytes. The
    /// writer decides whether to flate-compress when serializing (spec
    /// §4.I: "streams larger than 64 bytes are flate-compressed when
    /// `/Filter` is not explicitly set").
    Stream(Dictionary, Vec<u8>),
}

pub type Dictionary = Vec<(String, Object)>;

macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => {
        vec![ $( ($key.to_string(), $crate::pdf::object::Object::from($value)) ),* ]
    };
}
pub(crate) use dict;

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Object::Int(v)
    }
}
impl From<i32> for Object {
    fn from(v: i32) -> Self {
        Object::Int(v as i64)
    }
}
impl From<u32> for Object {
    fn from(v: u32) -> Self {
        Object::Int(v as i64)
    }
}
impl From<usize> for Object {
    fn from(v: usize) -> Self {
        Object::Int(v as i64)
    }
}
impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Object::Real(v)
    }
}
impl From<f32> for Object {
    fn from(v: f32) -> Self {
        Object::Real(v as f64)
    }
}
impl From<bool> for Object {
    fn from(v: bool) -> Self {
        Object::Bool(v)
    }
}
impl From<&str> for Object {
    fn from(v: &str) -> Self {
        Object::Name(v.to_string())
    }
}
impl From<String> for Object {
    fn from(v: String) -> Self {
        Object::Name(v)
    }
}
impl From<Vec<Object>> for Object {
    fn from(v: Vec<Object>) -> Self {
        Object::Array(v)
    }
}
impl From<Dictionary> for Object {
    fn from(v: Dictionary) -> Self {
        Object::Dictionary(v)
    }
}
impl From<ObjectId> for Object {
    fn from(v: ObjectId) -> Self {
        Object::Reference(v)
    }
}

impl Object {
    pub fn literal_string(s: impl AsRef<[u8]>) -> Object {
        Object::LiteralString(s.as_ref().to_vec())
    }

    pub fn hex_string(bytes: impl Into<Vec<u8>>) -> Object {
        Object::HexString(bytes.into())
    }

    /// Rounds to two decimals, per spec §4.I "all numeric output is rounded
    /// to two decimals".
    pub fn rounded(v: f64) -> Object {
        Object::Real((v * 100.0).round() / 100.0)
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self {
            Object::Null => w.write_all(b"null"),
            Object::Bool(true) => w.write_all(b"true"),
            Object::Bool(false) => w.write_all(b"false"),
            Object::Int(v) => w.write_all(itoa::Buffer::new().format(*v).as_bytes()),
            Object::Real(v) => w.write_all(dtoa::Buffer::new().format(*v).as_bytes()),
            Object::Name(name) => write_name(name.as_bytes(), w),
            Object::LiteralString(bytes) => write_literal_string(bytes, w),
            Object::HexString(bytes) => write_hex_string(bytes, w),
            Object::Array(items) => {
                w.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        w.write_all(b" ")?;
                    }
                    item.write(w)?;
                }
                w.write_all(b"]")
            }
            Object::Dictionary(pairs) => write_dictionary(pairs, w),
            Object::Reference(ObjectId(id)) => {
                w.write_all(itoa::Buffer::new().format(*id).as_bytes())?;
                w.write_all(b" 0 R")
            }
            Object::Stream(dict, raw) => write_stream(dict, raw, w),
        }
    }
}

fn write_dictionary<W: Write>(pairs: &Dictionary, w: &mut W) -> io::Result<()> {
    w.write_all(b"<<")?;
    for (key, value) in pairs {
        w.write_all(b" /")?;
        w.write_all(key.as_bytes())?;
        w.write_all(b" ")?;
        value.write(w)?;
    }
    w.write_all(b" >>")
}

/// Streams larger than 64 bytes get `FlateDecode`'d unless the dictionary
/// already carries a `/Filter` entry (spec §4.I). A `("Filter", Null)`
/// entry suppresses compression without emitting a real `/Filter` key —
/// how `ExportOptions::compress = false` opts a stream out.
fn write_stream<W: Write>(dict: &Dictionary, raw: &[u8], w: &mut W) -> io::Result<()> {
    let has_filter = dict.iter().any(|(k, _)| k == "Filter");
    let dict: Dictionary = dict.iter().filter(|(k, v)| !(k == "Filter" && *v == Object::Null)).cloned().collect();
    let dict = &dict;
    let (filter_name, body): (Option<&str>, std::borrow::Cow<[u8]>) = if !has_filter && raw.len() > 64 {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw)?;
        (Some("FlateDecode"), std::borrow::Cow::Owned(encoder.finish()?))
    } else {
        (None, std::borrow::Cow::Borrowed(raw))
    };

    let mut full_dict = dict.clone();
    if let Some(filter) = filter_name {
        full_dict.push(("Filter".to_string(), Object::Name(filter.to_string())));
    }
    full_dict.push(("Length".to_string(), Object::Int(body.len() as i64)));
    write_dictionary(&full_dict, w)?;
    w.write_all(b"\nstream\n")?;
    w.write_all(&body)?;
    w.write_all(b"\nendstream")
}

fn write_literal_string<W: Write>(bytes: &[u8], w: &mut W) -> io::Result<()> {
    w.write_all(b"(")?;
    for &byte in bytes {
        match byte {
            b'\\' | b'(' | b')' => w.write_all(&[b'\\', byte])?,
            b'\n' => w.write_all(b"\\n")?,
            b'\r' => w.write_all(b"\\r")?,
            _ => w.write_all(&[byte])?,
        }
    }
    w.write_all(b")")
}

fn write_hex_string<W: Write>(bytes: &[u8], w: &mut W) -> io::Result<()> {
    w.write_all(b"<")?;
    for &byte in bytes {
        write_hex_byte(byte, w)?;
    }
    w.write_all(b">")
}

fn write_hex_byte<W: Write>(byte: u8, w: &mut W) -> io::Result<()> {
    const DIGITS: [u8; 16] = *b"0123456789ABCDEF";
    w.write_all(&[DIGITS[(byte >> 4) as usize], DIGITS[(byte & 0x0f) as usize]])
}

fn write_name<W: Write>(name: &[u8], w: &mut W) -> io::Result<()> {
    w.write_all(b"/")?;
    for &byte in name {
        if is_regular_char(byte) {
            w.write_all(&[byte])?;
        } else {
            w.write_all(b"#")?;
            write_hex_byte(byte, w)?;
        }
    }
    Ok(())
}

/// PDF name characters that need no `#xx` escaping: everything but
/// whitespace and the ten delimiter characters (spec grounding: PDF32000
/// §7.2.2, mirrored from the teacher's `CharKind` lookup table).
fn is_regular_char(byte: u8) -> bool {
    !matches!(byte, 0 | 0x09 | 0x0a | 0x0c | 0x0d | 0x20)
        && !matches!(byte, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_escapes_delimiters() {
        let mut buf = Vec::new();
        Object::Name("a/b".to_string()).write(&mut buf).unwrap();
        assert_eq!(buf, b"/a#2Fb");
    }

    #[test]
    fn small_stream_is_not_compressed() {
        let mut buf = Vec::new();
        Object::Stream(vec![], b"BT ET".to_vec()).write(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("Filter"));
        assert!(text.contains("BT ET"));
    }

    #[test]
    fn literal_string_escapes_parens() {
        let mut buf = Vec::new();
        Object::literal_string("a(b)c").write(&mut buf).unwrap();
        assert_eq!(buf, b"(a\\(b\\)c)");
    }
}
