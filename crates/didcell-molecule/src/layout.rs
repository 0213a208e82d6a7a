//! # Layout Primitives — Molecule Tables, Vectors, Options, Unions
//!
//! The molecule building blocks the schemas are assembled from:
//!
//! | Kind    | Layout                                                        |
//! |---------|---------------------------------------------------------------|
//! | fixvec  | `count: u32le` then `count` fixed-size items                  |
//! | dynvec  | `full_size: u32le`, item offsets (u32le each), item bodies    |
//! | table   | dynvec layout with a schema-fixed field count                 |
//! | option  | empty bytes = none, otherwise the item itself                 |
//! | union   | `item_id: u32le` then the active variant's body               |
//!
//! Verification is strict: every size, offset, and count is checked against
//! the enclosing slice before any field is handed out, offsets must be
//! non-decreasing, and a table's field count must equal the schema's exactly
//! (`compatible = false` — extra trailing fields are a decode error).

use didcell_core::CodecError;

/// Size of the u32 length/offset/count prefix.
pub const NUMBER_SIZE: usize = 4;

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, CodecError> {
    let end = offset.checked_add(NUMBER_SIZE).ok_or_else(|| {
        CodecError::InconsistentLayout(format!("offset {offset} overflows"))
    })?;
    if end > buf.len() {
        return Err(CodecError::Truncated {
            offset,
            needed: NUMBER_SIZE,
            available: buf.len().saturating_sub(offset),
        });
    }
    let mut raw = [0u8; NUMBER_SIZE];
    raw.copy_from_slice(&buf[offset..end]);
    Ok(u32::from_le_bytes(raw))
}

/// Split a table or dynvec buffer into its field/item slices.
///
/// For a table, pass `Some(expected)` to pin the field count; a dynvec
/// passes `None` and accepts any count the header declares.
fn header_slices<'a>(
    buf: &'a [u8],
    expected: Option<usize>,
) -> Result<Vec<&'a [u8]>, CodecError> {
    let full_size = read_u32(buf, 0)? as usize;
    if full_size != buf.len() {
        return Err(CodecError::InconsistentLayout(format!(
            "declared size {full_size} != buffer size {}",
            buf.len()
        )));
    }
    if full_size == NUMBER_SIZE {
        // Zero fields. Legal only when the schema has none.
        if let Some(expected) = expected {
            if expected != 0 {
                return Err(CodecError::FieldCountMismatch {
                    expected,
                    actual: 0,
                });
            }
        }
        return Ok(Vec::new());
    }
    let first_offset = read_u32(buf, NUMBER_SIZE)? as usize;
    if first_offset % NUMBER_SIZE != 0 || first_offset < NUMBER_SIZE * 2 || first_offset > full_size
    {
        return Err(CodecError::InconsistentLayout(format!(
            "bad first offset {first_offset}"
        )));
    }
    let count = first_offset / NUMBER_SIZE - 1;
    if let Some(expected) = expected {
        if count != expected {
            return Err(CodecError::FieldCountMismatch {
                expected,
                actual: count,
            });
        }
    }
    let mut offsets = Vec::with_capacity(count + 1);
    for i in 0..count {
        offsets.push(read_u32(buf, NUMBER_SIZE * (i + 1))? as usize);
    }
    offsets.push(full_size);
    for pair in offsets.windows(2) {
        if pair[0] > pair[1] || pair[1] > full_size {
            return Err(CodecError::InconsistentLayout(format!(
                "offsets not monotonic: {} > {}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(offsets
        .windows(2)
        .map(|pair| &buf[pair[0]..pair[1]])
        .collect())
}

/// Decode a table with an exact field count into its field slices.
pub fn table_fields<'a>(buf: &'a [u8], field_count: usize) -> Result<Vec<&'a [u8]>, CodecError> {
    header_slices(buf, Some(field_count))
}

/// Decode a dynvec into its item slices.
pub fn dynvec_items(buf: &[u8]) -> Result<Vec<&[u8]>, CodecError> {
    header_slices(buf, None)
}

/// Decode a fixvec of bytes (`Bytes` / `Uint8Vec`) into its payload.
pub fn fixvec_bytes(buf: &[u8]) -> Result<&[u8], CodecError> {
    let count = read_u32(buf, 0)? as usize;
    let body = &buf[NUMBER_SIZE..];
    if body.len() != count {
        return Err(CodecError::InconsistentLayout(format!(
            "fixvec declares {count} bytes, body has {}",
            body.len()
        )));
    }
    Ok(body)
}

/// Decode an option: empty bytes is none, anything else is the item.
pub fn option_body(buf: &[u8]) -> Option<&[u8]> {
    if buf.is_empty() {
        None
    } else {
        Some(buf)
    }
}

/// Decode a union header, returning the item id and the variant body.
pub fn union_body(buf: &[u8]) -> Result<(u32, &[u8]), CodecError> {
    let item_id = read_u32(buf, 0)?;
    Ok((item_id, &buf[NUMBER_SIZE..]))
}

// ── Encoding ─────────────────────────────────────────────────────────

/// Encode a fixvec of bytes.
pub fn encode_fixvec_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(NUMBER_SIZE + data.len());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// Encode a table or dynvec from already-encoded field bodies.
pub fn encode_table(fields: &[Vec<u8>]) -> Vec<u8> {
    if fields.is_empty() {
        return (NUMBER_SIZE as u32).to_le_bytes().to_vec();
    }
    let header_size = NUMBER_SIZE * (1 + fields.len());
    let body_size: usize = fields.iter().map(Vec::len).sum();
    let full_size = header_size + body_size;
    let mut out = Vec::with_capacity(full_size);
    out.extend_from_slice(&(full_size as u32).to_le_bytes());
    let mut offset = header_size;
    for field in fields {
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += field.len();
    }
    for field in fields {
        out.extend_from_slice(field);
    }
    out
}

/// Encode a union from an item id and the active variant's body.
pub fn encode_union(item_id: u32, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(NUMBER_SIZE + body.len());
    out.extend_from_slice(&item_id.to_le_bytes());
    out.extend_from_slice(body);
    out
}
