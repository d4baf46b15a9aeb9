//! Builds resource index bytes for tests, mirroring the layout `index::parse` reads.

use std::{
    fs,
    path::{Path, PathBuf},
};

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    index::{ResType, VERSION_LEN},
    qualifier::QualifierKey,
};

pub const TEST_VERSION: &str = "test index 1.0";

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    Array(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Item {
    id: u32,
    raw_type: u32,
    name: String,
    value: Value,
}

impl Item {
    pub fn scalar(id: u32, res_type: ResType, name: &str, value: &str) -> Self {
        Self::raw_type(id, res_type.raw(), name, value)
    }

    pub fn array(id: u32, res_type: ResType, name: &str, values: &[&str]) -> Self {
        Self {
            id,
            raw_type: res_type.raw(),
            name: name.to_owned(),
            value: Value::Array(values.iter().map(|v| (*v).to_owned()).collect()),
        }
    }

    /// Scalar item with an arbitrary (possibly invalid) type code.
    pub fn raw_type(id: u32, raw_type: u32, name: &str, value: &str) -> Self {
        Self {
            id,
            raw_type,
            name: name.to_owned(),
            value: Value::Scalar(value.to_owned()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexWriter {
    version: String,
    keys: Vec<(Vec<QualifierKey>, Vec<Item>)>,
}

impl Default for IndexWriter {
    fn default() -> Self {
        Self {
            version: TEST_VERSION.to_owned(),
            keys: Vec::new(),
        }
    }
}

impl IndexWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, qualifiers: &[QualifierKey], items: Vec<Item>) -> Self {
        self.keys.push((qualifiers.to_vec(), items));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        let mut version = [0u8; VERSION_LEN];
        let len = self.version.len().min(VERSION_LEN - 1);
        version[..len].copy_from_slice(&self.version.as_bytes()[..len]);
        buf.extend_from_slice(&version);
        let length_slot = buf.len();
        push_u32(&mut buf, 0);
        push_u32(&mut buf, self.keys.len() as u32);

        let mut idss_slots = Vec::with_capacity(self.keys.len());
        for (qualifiers, _) in &self.keys {
            buf.extend_from_slice(b"KEYS");
            idss_slots.push(buf.len());
            push_u32(&mut buf, 0);
            push_u32(&mut buf, qualifiers.len() as u32);
            for key in qualifiers {
                push_u32(&mut buf, key.kind.raw());
                push_u32(&mut buf, key.value);
            }
        }

        let mut item_slots = Vec::new();
        for ((_, items), slot) in self.keys.iter().zip(idss_slots) {
            let here = buf.len();
            patch_u32(&mut buf, slot, here);
            buf.extend_from_slice(b"IDSS");
            push_u32(&mut buf, items.len() as u32);
            for item in items {
                push_u32(&mut buf, item.id);
                item_slots.push((buf.len(), item));
                push_u32(&mut buf, 0);
            }
        }

        for (slot, item) in item_slots {
            let here = buf.len();
            patch_u32(&mut buf, slot, here);
            write_item(&mut buf, item);
        }

        let total = buf.len();
        patch_u32(&mut buf, length_slot, total);
        buf
    }

    /// Write the index to `<root>/<module>/resources.index` and return its path.
    pub fn write_module(&self, root: &Path, module: &str) -> PathBuf {
        let dir = root.join(module);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("resources.index");
        fs::write(&path, self.build()).unwrap();
        path
    }
}

fn write_item(buf: &mut Vec<u8>, item: &Item) {
    let start = buf.len();
    push_u32(buf, 0);
    push_u32(buf, item.raw_type);
    push_u32(buf, item.id);
    match &item.value {
        Value::Scalar(value) => push_string(buf, value),
        Value::Array(values) => {
            let run_slot = buf.len();
            buf.extend_from_slice(&[0, 0]);
            for value in values {
                push_string(buf, value);
            }
            let run_len = buf.len() - run_slot - 2;
            LittleEndian::write_u16(&mut buf[run_slot..], run_len as u16);
        }
    }
    push_string(buf, &item.name);
    let size = buf.len() - start;
    patch_u32(buf, start, size);
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    let mut word = [0u8; 4];
    LittleEndian::write_u32(&mut word, value);
    buf.extend_from_slice(&word);
}

fn patch_u32(buf: &mut [u8], at: usize, value: usize) {
    LittleEndian::write_u32(&mut buf[at..at + 4], value as u32);
}

fn push_string(buf: &mut Vec<u8>, value: &str) {
    let mut len = [0u8; 2];
    LittleEndian::write_u16(&mut len, (value.len() + 1) as u16);
    buf.extend_from_slice(&len);
    buf.extend_from_slice(value.as_bytes());
    buf.push(0);
}
