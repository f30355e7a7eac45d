//! JSON I/O handling for CLI
//!
//! - Input: one JSON document, possibly spread over several lines
//! - Output: one JSON document per line
//! - UTF-8 only

use std::io::{Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read all of `reader` as raw bytes, rejecting blank input
pub fn read_bytes<R: Read>(reader: &mut R) -> CliResult<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.iter().all(u8::is_ascii_whitespace) {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(buffer)
}

/// Read one JSON document from `reader`
pub fn read_document<R: Read>(reader: &mut R) -> CliResult<Value> {
    let bytes = read_bytes(reader)?;
    let value: Value = serde_json::from_slice(&bytes)?;
    Ok(value)
}

/// Write a success response
pub fn write_response<W: Write>(writer: &mut W, data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *writer, &response)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

/// Write raw bytes followed by a newline
pub fn write_raw<W: Write>(writer: &mut W, bytes: &[u8]) -> CliResult<()> {
    writer.write_all(bytes)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
