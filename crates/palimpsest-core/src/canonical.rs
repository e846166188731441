//! Canonical CBOR encoding of entry headers.
//!
//! Headers are signed and hashed, so their bytes must be identical on every
//! platform. The encoding follows RFC 8949 core deterministic rules:
//! smallest-width integers, definite lengths, and map keys in ascending
//! order. Header keys are small integers (0-5) so they already encode in
//! sorted single-byte form and are emitted in that order directly.
//!
//! Entry layout on disk and on the wire:
//! `canonical_header || content || signature(64)`.

use ciborium::value::Value;

use crate::crypto::{AuthorId, ContentHash, Signature};
use crate::entry::{EntryHeader, LogEntry};
use crate::error::CoreError;
use crate::types::EntryKey;

const SIGNATURE_LEN: usize = 64;

mod keys {
    pub const VERSION: u64 = 0;
    pub const AUTHOR: u64 = 1;
    pub const SEQ: u64 = 2;
    pub const TIMESTAMP: u64 = 3;
    pub const PREV: u64 = 4;
    pub const CONTENT_HASH: u64 = 5;
    pub const COUNT: u64 = 6;
}

mod major {
    pub const UINT: u8 = 0;
    pub const NEGATIVE: u8 = 1;
    pub const BYTES: u8 = 2;
    pub const MAP: u8 = 5;
}

const CBOR_NULL: u8 = 0xf6;

/// Encode an entry header to canonical CBOR.
pub fn canonical_header_bytes(header: &EntryHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(128);
    write_head(&mut out, major::MAP, keys::COUNT);

    write_head(&mut out, major::UINT, keys::VERSION);
    write_head(&mut out, major::UINT, u64::from(header.version));

    write_head(&mut out, major::UINT, keys::AUTHOR);
    write_bytes(&mut out, header.author.as_bytes());

    write_head(&mut out, major::UINT, keys::SEQ);
    write_head(&mut out, major::UINT, header.seq);

    write_head(&mut out, major::UINT, keys::TIMESTAMP);
    write_int(&mut out, header.timestamp);

    write_head(&mut out, major::UINT, keys::PREV);
    match &header.prev {
        Some(prev) => write_bytes(&mut out, prev.as_bytes()),
        None => out.push(CBOR_NULL),
    }

    write_head(&mut out, major::UINT, keys::CONTENT_HASH);
    write_bytes(&mut out, header.content_hash.as_bytes());

    out
}

/// Full canonical encoding of an entry: header, content, signature.
pub fn canonical_bytes(entry: &LogEntry) -> Vec<u8> {
    let mut out = canonical_header_bytes(&entry.header);
    out.extend_from_slice(&entry.content);
    out.extend_from_slice(entry.signature.as_bytes());
    out
}

/// The bytes covered by the signature: header followed by content.
pub fn signed_message(entry: &LogEntry) -> Vec<u8> {
    let mut out = canonical_header_bytes(&entry.header);
    out.extend_from_slice(&entry.content);
    out
}

/// Write a CBOR initial byte plus argument in its shortest form.
fn write_head(out: &mut Vec<u8>, major: u8, arg: u64) {
    let mt = major << 5;
    match arg {
        0..=23 => out.push(mt | arg as u8),
        24..=0xff => out.extend_from_slice(&[mt | 24, arg as u8]),
        0x100..=0xffff => {
            out.push(mt | 25);
            out.extend_from_slice(&(arg as u16).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(mt | 26);
            out.extend_from_slice(&(arg as u32).to_be_bytes());
        }
        _ => {
            out.push(mt | 27);
            out.extend_from_slice(&arg.to_be_bytes());
        }
    }
}

fn write_int(out: &mut Vec<u8>, n: i64) {
    if n >= 0 {
        write_head(out, major::UINT, n as u64);
    } else {
        // CBOR stores -1 - n for negatives.
        write_head(out, major::NEGATIVE, (-1 - n) as u64);
    }
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_head(out, major::BYTES, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Decode an entry from its canonical bytes.
pub fn decode_entry(bytes: &[u8]) -> Result<LogEntry, CoreError> {
    if bytes.len() < SIGNATURE_LEN {
        return Err(CoreError::MalformedEntry("too short".into()));
    }

    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))?;
    let header = header_from_value(&value)?;

    // Re-encode to learn where the header ends; canonical form makes this exact.
    let header_len = canonical_header_bytes(&header).len();
    let rest = bytes
        .get(header_len..)
        .filter(|rest| rest.len() >= SIGNATURE_LEN)
        .ok_or_else(|| CoreError::MalformedEntry("missing signature".into()))?;

    let (content, sig) = rest.split_at(rest.len() - SIGNATURE_LEN);
    let signature = Signature::try_from(sig)
        .map_err(|_| CoreError::MalformedEntry("invalid signature length".into()))?;

    Ok(LogEntry::from_parts(
        header,
        content.to_vec().into(),
        signature,
    ))
}

fn header_from_value(value: &Value) -> Result<EntryHeader, CoreError> {
    let map = value
        .as_map()
        .ok_or_else(|| CoreError::MalformedEntry("header is not a map".into()))?;

    let field = |key: u64| -> Option<&Value> {
        map.iter()
            .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == i128::from(key)))
            .map(|(_, v)| v)
    };
    let int = |key: u64, name: &str| -> Result<i128, CoreError> {
        match field(key) {
            Some(Value::Integer(i)) => Ok(i128::from(*i)),
            _ => Err(CoreError::MalformedEntry(format!("missing {}", name))),
        }
    };
    let bytes32 = |v: &Value, name: &str| -> Result<[u8; 32], CoreError> {
        v.as_bytes()
            .and_then(|b| <[u8; 32]>::try_from(b.as_slice()).ok())
            .ok_or_else(|| CoreError::MalformedEntry(format!("invalid {}", name)))
    };

    let version = u8::try_from(int(keys::VERSION, "version")?)
        .map_err(|_| CoreError::MalformedEntry("version out of range".into()))?;
    let seq = u64::try_from(int(keys::SEQ, "seq")?)
        .map_err(|_| CoreError::MalformedEntry("seq out of range".into()))?;
    let timestamp = i64::try_from(int(keys::TIMESTAMP, "timestamp")?)
        .map_err(|_| CoreError::MalformedEntry("timestamp out of range".into()))?;

    let author = field(keys::AUTHOR)
        .ok_or_else(|| CoreError::MalformedEntry("missing author".into()))
        .and_then(|v| bytes32(v, "author"))
        .map(AuthorId)?;

    let prev = match field(keys::PREV) {
        None | Some(Value::Null) => None,
        Some(v) => Some(EntryKey(bytes32(v, "prev")?)),
    };

    let content_hash = field(keys::CONTENT_HASH)
        .ok_or_else(|| CoreError::MalformedEntry("missing content_hash".into()))
        .and_then(|v| bytes32(v, "content_hash"))
        .map(ContentHash)?;

    Ok(EntryHeader {
        version,
        author,
        seq,
        timestamp,
        prev,
        content_hash,
    })
}
