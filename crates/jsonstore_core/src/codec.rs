//! JSON record encoding.
//!
//! Stored documents are tab-indented for human readability and always end
//! with a newline. There is no schema versioning; callers keep the shapes
//! they write and read compatible.

use crate::error::StoreResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

const INDENT: &[u8] = b"\t";

/// Serializes `value` into the on-disk document format.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> StoreResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes one stored document.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}
