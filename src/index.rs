//! Binary resource index parser.
//!
//! All integers are little-endian; offsets are absolute from the start of the
//! buffer.
//!
//! ```text
//! header   [128] version (NUL padded) | u32 length | u32 key_count
//! key      "KEYS" | u32 idss_offset | u32 param_count | param_count × (u32 kind, u32 value)
//! id block "IDSS" | u32 count | count × (u32 id, u32 item_offset)
//! item     u32 size | u32 type | u32 id | value | name
//! value    scalar: string
//!          array:  u16 run_len | string* filling run_len bytes
//! string   u16 len (NUL included) | len bytes ending in NUL
//! ```
//!
//! Parsing is all-or-nothing: any short read, tag mismatch or malformed
//! length discards the whole table.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace, warn};
use thiserror::Error;

use crate::{
    config::Configuration,
    qualifier::{KeyKind, QualifierKey, QualifierPath, config_from_keys, folder_from_keys},
};

pub const VERSION_LEN: usize = 128;
pub const HEADER_LEN: usize = VERSION_LEN + 8;

const KEYS_TAG: &[u8; 4] = b"KEYS";
const IDSS_TAG: &[u8; 4] = b"IDSS";

/// Upper bound on speculative pre-allocation driven by untrusted counts.
const MAX_PREALLOC: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// A read ran past the end of the buffer.
    #[error("index truncated at offset {offset}")]
    Truncated { offset: u64 },

    #[error("index header declares no content")]
    EmptyIndex,

    #[error("expected `{expected}` tag at offset {offset}")]
    BadTag { expected: &'static str, offset: u64 },

    #[error("malformed length field at offset {offset}")]
    BadLength { offset: u64 },

    #[error("unknown resource type {raw} for id {id}")]
    UnknownType { id: u32, raw: u32 },

    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidString { offset: u64 },
}

macro_rules! res_types {
    ($($variant:ident = $raw:literal => $name:literal $(, array = $array:literal)?;)+) => {
        /// Declared type of a resource item.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ResType {
            $($variant),+
        }

        impl ResType {
            #[inline]
            pub const fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $($raw => Some(ResType::$variant),)+
                    _ => None,
                }
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                match self {
                    $(ResType::$variant => $raw),+
                }
            }

            /// Name used in `$name:id` references.
            #[inline]
            pub const fn type_name(self) -> &'static str {
                match self {
                    $(ResType::$variant => $name),+
                }
            }

            pub fn from_type_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ResType::$variant),)+
                    _ => None,
                }
            }

            /// Array types store a list of strings instead of a single value.
            #[inline]
            pub const fn is_array(self) -> bool {
                match self {
                    $(ResType::$variant => false $(|| $array)?),+
                }
            }
        }
    };
}

res_types! {
    Values = 0 => "values";
    Animation = 1 => "anim";
    Drawable = 2 => "drawable";
    Layout = 3 => "layout";
    Menu = 4 => "menu";
    Mipmap = 5 => "mipmap";
    Raw = 6 => "raw";
    Xml = 7 => "xml";
    Integer = 8 => "integer";
    String = 9 => "string";
    StringArray = 10 => "strarray", array = true;
    IntArray = 11 => "intarray", array = true;
    Boolean = 12 => "boolean";
    Dimen = 13 => "dimen";
    Color = 14 => "color";
    Id = 15 => "id";
    Theme = 16 => "theme", array = true;
    Plurals = 17 => "plural", array = true;
    Float = 18 => "float";
    Media = 19 => "media";
    Profile = 20 => "profile";
    Svg = 21 => "svg";
    Pattern = 22 => "pattern", array = true;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    Scalar(String),
    Array(Vec<String>),
}

impl ItemValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ItemValue::Scalar(s) => Some(s),
            ItemValue::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            ItemValue::Array(values) => Some(values),
            ItemValue::Scalar(_) => None,
        }
    }
}

/// One decoded resource item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdItem {
    pub id: u32,
    pub res_type: ResType,
    pub name: String,
    pub value: ItemValue,
}

impl IdItem {
    #[inline]
    pub fn is_array(&self) -> bool {
        self.res_type.is_array()
    }

    /// Pattern/theme items name their parent in a leading element when the
    /// array length is odd; returns `(parent, key/value pairs)`.
    pub fn split_parent(&self) -> (Option<&str>, &[String]) {
        match self.value.as_array() {
            Some([parent, rest @ ..]) if rest.len() % 2 == 0 => (Some(parent), rest),
            Some(values) => (None, values),
            None => (None, &[]),
        }
    }
}

/// Items of one qualifier key block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBlock {
    pub qualifiers: QualifierPath,
    pub items: Vec<IdItem>,
}

/// A parsed index. Only key blocks that survived the default-configuration
/// filter are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTable {
    pub version: String,
    pub length: u32,
    pub keys: Vec<KeyBlock>,
}

/// Parse an index buffer. With `filter`, key blocks whose qualifiers do not
/// match it are skipped without decoding their items.
pub fn parse(bytes: &[u8], filter: Option<&Configuration>) -> Result<ResourceTable, TableError> {
    if bytes.len() < HEADER_LEN {
        return Err(TableError::Truncated {
            offset: bytes.len() as u64,
        });
    }

    let mut cur = Cursor::new(bytes);
    let version = read_version(&mut cur)?;
    let length = read_u32(&mut cur)?;
    let key_count = read_u32(&mut cur)?;
    if length == 0 || key_count == 0 {
        return Err(TableError::EmptyIndex);
    }
    trace!("index header: version={version:?}, length={length}, keys={key_count}");

    let mut keys = Vec::with_capacity((key_count as usize).min(MAX_PREALLOC));
    for _ in 0..key_count {
        expect_tag(&mut cur, KEYS_TAG, "KEYS")?;
        let idss_offset = read_u32(&mut cur)?;
        let param_count = read_u32(&mut cur)?;

        let mut qualifiers = QualifierPath::new();
        for _ in 0..param_count {
            let kind = KeyKind::from_raw(read_u32(&mut cur)?);
            let value = read_u32(&mut cur)?;
            qualifiers.push(QualifierKey::new(kind, value));
        }

        if let Some(filter) = filter
            && !config_from_keys(&qualifiers).matches(filter)
        {
            debug!(
                "skipping key block `{}` (does not match default configuration)",
                folder_from_keys(&qualifiers)
            );
            continue;
        }

        let items = parse_id_block(bytes, idss_offset)?;
        trace!(
            "key block `{}`: {} items",
            folder_from_keys(&qualifiers),
            items.len()
        );
        keys.push(KeyBlock { qualifiers, items });
    }

    Ok(ResourceTable {
        version,
        length,
        keys,
    })
}

fn parse_id_block(bytes: &[u8], offset: u32) -> Result<Vec<IdItem>, TableError> {
    let mut cur = cursor_at(bytes, offset)?;
    expect_tag(&mut cur, IDSS_TAG, "IDSS")?;
    let count = read_u32(&mut cur)?;

    let mut items = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
    for _ in 0..count {
        let id = read_u32(&mut cur)?;
        let item_offset = read_u32(&mut cur)?;
        items.push(parse_item(bytes, item_offset, id)?);
    }
    Ok(items)
}

fn parse_item(bytes: &[u8], offset: u32, expected_id: u32) -> Result<IdItem, TableError> {
    let mut cur = cursor_at(bytes, offset)?;
    let size = read_u32(&mut cur)?;
    let raw_type = read_u32(&mut cur)?;
    let id = read_u32(&mut cur)?;
    if id != expected_id {
        warn!("item at offset {offset} has id {id:#x}, id table says {expected_id:#x}");
    }
    let res_type = ResType::from_raw(raw_type).ok_or(TableError::UnknownType { id, raw: raw_type })?;

    let value = if res_type.is_array() {
        let run_offset = cur.position();
        let run_len = u64::from(read_u16(&mut cur)?);
        let end = cur.position() + run_len;
        if end > bytes.len() as u64 {
            return Err(TableError::BadLength { offset: run_offset });
        }
        let mut values = Vec::new();
        while cur.position() < end {
            values.push(read_string(&mut cur)?);
        }
        if cur.position() != end {
            return Err(TableError::BadLength { offset: run_offset });
        }
        ItemValue::Array(values)
    } else {
        ItemValue::Scalar(read_string(&mut cur)?)
    };
    let name = read_string(&mut cur)?;
    trace!("item {id:#x} `{name}` ({}), {size} bytes", res_type.type_name());

    Ok(IdItem {
        id,
        res_type,
        name,
        value,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Primitive reads
// ─────────────────────────────────────────────────────────────────────────────

fn cursor_at(bytes: &[u8], offset: u32) -> Result<Cursor<&[u8]>, TableError> {
    if offset as usize >= bytes.len() {
        return Err(TableError::Truncated {
            offset: u64::from(offset),
        });
    }
    let mut cur = Cursor::new(bytes);
    cur.set_position(u64::from(offset));
    Ok(cur)
}

#[inline]
fn read_u32(cur: &mut Cursor<&[u8]>) -> Result<u32, TableError> {
    let offset = cur.position();
    cur.read_u32::<LittleEndian>()
        .map_err(|_| TableError::Truncated { offset })
}

#[inline]
fn read_u16(cur: &mut Cursor<&[u8]>) -> Result<u16, TableError> {
    let offset = cur.position();
    cur.read_u16::<LittleEndian>()
        .map_err(|_| TableError::Truncated { offset })
}

fn read_bytes<'a>(cur: &mut Cursor<&'a [u8]>, len: usize) -> Result<&'a [u8], TableError> {
    let offset = cur.position();
    let bytes: &'a [u8] = *cur.get_ref();
    let start = offset as usize;
    let data = start
        .checked_add(len)
        .and_then(|end| bytes.get(start..end))
        .ok_or(TableError::Truncated { offset })?;
    cur.set_position(offset + len as u64);
    Ok(data)
}

fn expect_tag(
    cur: &mut Cursor<&[u8]>,
    tag: &[u8; 4],
    expected: &'static str,
) -> Result<(), TableError> {
    let offset = cur.position();
    if read_bytes(cur, tag.len())? != tag {
        return Err(TableError::BadTag { expected, offset });
    }
    Ok(())
}

/// Length-prefixed string; the length includes a trailing NUL that is stripped.
fn read_string(cur: &mut Cursor<&[u8]>) -> Result<String, TableError> {
    let offset = cur.position();
    let len = usize::from(read_u16(cur)?);
    if len == 0 {
        return Err(TableError::BadLength { offset });
    }
    let raw = read_bytes(cur, len)?;
    let Some((0, text)) = raw.split_last() else {
        return Err(TableError::BadLength { offset });
    };
    std::str::from_utf8(text)
        .map(str::to_owned)
        .map_err(|_| TableError::InvalidString { offset })
}

fn read_version(cur: &mut Cursor<&[u8]>) -> Result<String, TableError> {
    let offset = cur.position();
    let raw = read_bytes(cur, VERSION_LEN)?;
    let end = memchr::memchr(0, raw).unwrap_or(raw.len());
    std::str::from_utf8(&raw[..end])
        .map(str::to_owned)
        .map_err(|_| TableError::InvalidString { offset })
}
