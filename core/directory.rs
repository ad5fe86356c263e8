//! Component directory payload (reply to `RequestComponentInformation`).
//!
//! ```text
//! [N]                                1 byte component count
//! name_1,name_2,...,name_N,          component names, comma-terminated
//! [size_1]...[size_N]                2-byte variable counts (255-weighted)
//! var_1,var_2,...,var_T,             all variable names, T = sum(size_i)
//! [kind_1]...[kind_T]                1-byte kind codes, no delimiter
//! ```
//!
//! Splits are always bounded by the announced counts, so bytes that happen to
//! equal ',' inside the count or kind sections are never mistaken for
//! delimiters.

use crate::error::{ProtocolError, Result};
use crate::protocol::{decode_length, length_prefix};
use crate::types::{ComponentDescriptor, Status, Variable, VariableKind};

const DELIMITER: u8 = b',';
const SIZE_WIDTH: usize = 2;

/// Split on ',' at most `limit` times. Same contract as a bounded byte split:
/// up to `limit + 1` pieces, the last one holding everything after the last
/// split point untouched.
fn split_bounded(data: &[u8], limit: usize) -> Vec<&[u8]> {
    let mut pieces = Vec::with_capacity(limit.min(data.len()) + 1);
    let mut rest = data;
    while pieces.len() < limit {
        match rest.iter().position(|&b| b == DELIMITER) {
            Some(pos) => {
                pieces.push(&rest[..pos]);
                rest = &rest[pos + 1..];
            }
            None => break,
        }
    }
    pieces.push(rest);
    pieces
}

fn decode_name(raw: &[u8], what: &str) -> Result<String> {
    String::from_utf8(raw.to_vec())
        .map_err(|_| ProtocolError::MalformedDirectory(format!("{} name is not valid UTF-8", what)))
}

/// Decode a directory payload into ordered component descriptors.
pub fn decode_directory(payload: &[u8]) -> Result<Vec<ComponentDescriptor>> {
    if Status::from_payload(payload) == Some(Status::Error) {
        return Err(ProtocolError::DirectoryQueryFailed);
    }

    let (&count, body) = payload
        .split_first()
        .ok_or_else(|| ProtocolError::MalformedDirectory("empty payload".to_string()))?;
    let count = count as usize;

    let mut pieces = split_bounded(body, count);
    if pieces.len() != count + 1 {
        return Err(ProtocolError::MalformedDirectory(format!(
            "announced {} components, found {} names",
            count,
            pieces.len() - 1
        )));
    }
    let rest = pieces.pop().unwrap_or_default();
    let component_names = pieces
        .into_iter()
        .map(|raw| decode_name(raw, "component"))
        .collect::<Result<Vec<_>>>()?;

    let sizes_len = count * SIZE_WIDTH;
    if rest.len() < sizes_len {
        return Err(ProtocolError::MalformedDirectory(format!(
            "expected {} bytes of variable counts, found {}",
            sizes_len,
            rest.len()
        )));
    }
    let sizes: Vec<usize> = rest[..sizes_len]
        .chunks(SIZE_WIDTH)
        .map(|chunk| decode_length(chunk) as usize)
        .collect();
    let total: usize = sizes.iter().sum();
    let names_and_kinds = &rest[sizes_len..];
    // Each variable needs at least a delimiter and a kind byte
    if total > names_and_kinds.len() {
        return Err(ProtocolError::MalformedDirectory(format!(
            "announced {} variables in {} bytes",
            total,
            names_and_kinds.len()
        )));
    }

    let mut pieces = split_bounded(names_and_kinds, total);
    if pieces.len() != total + 1 {
        return Err(ProtocolError::MalformedDirectory(format!(
            "announced {} variables, found {} names",
            total,
            pieces.len() - 1
        )));
    }
    let kind_codes = pieces.pop().unwrap_or_default();
    if kind_codes.len() < total {
        return Err(ProtocolError::MalformedDirectory(format!(
            "announced {} variables, found {} kind codes",
            total,
            kind_codes.len()
        )));
    }

    let mut names = pieces.into_iter();
    let mut codes = kind_codes.iter();
    let mut components = Vec::with_capacity(count);
    for (name, size) in component_names.into_iter().zip(sizes) {
        let mut variables = Vec::with_capacity(size);
        for (raw_name, &code) in names.by_ref().take(size).zip(codes.by_ref().take(size)) {
            variables.push(Variable {
                name: decode_name(raw_name, "variable")?,
                kind: VariableKind::try_from(code)?,
            });
        }
        components.push(ComponentDescriptor { name, variables });
    }

    Ok(components)
}

/// Encode descriptors into the directory wire shape. Inverse of [`decode_directory`].
pub fn encode_directory(components: &[ComponentDescriptor]) -> Result<Vec<u8>> {
    fn push_name(bytes: &mut Vec<u8>, name: &str) -> Result<()> {
        if name.contains(',') {
            return Err(ProtocolError::DelimiterInName(name.to_string()));
        }
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(DELIMITER);
        Ok(())
    }

    let mut bytes = length_prefix(components.len() as u64, 1)?;
    for component in components {
        push_name(&mut bytes, &component.name)?;
    }
    for component in components {
        bytes.extend_from_slice(&length_prefix(component.variables.len() as u64, SIZE_WIDTH)?);
    }
    for variable in components.iter().flat_map(|c| &c.variables) {
        push_name(&mut bytes, &variable.name)?;
    }
    bytes.extend(
        components
            .iter()
            .flat_map(|c| &c.variables)
            .map(|v| v.kind.as_u8()),
    );
    Ok(bytes)
}
