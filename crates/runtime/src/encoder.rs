//! Normalizes engine output into response bytes.
//!
//! Engines answer with plain text, hex text, or raw bytes. Everything is
//! first brought to hex text; [`ResultEncoding::CharBytes`] then emits one
//! byte per hex character (the established wire format), while
//! [`ResultEncoding::HexDecoded`] emits the decoded bytes instead.

use provevm_core::ResultEncoding;

/// Raw value returned by a proving engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutput {
    Text(String),
    Bytes(Vec<u8>),
}

impl EngineOutput {
    /// Bytes that are valid UTF-8 are treated as text.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => EngineOutput::Text(text),
            Err(e) => EngineOutput::Bytes(e.into_bytes()),
        }
    }
}

impl From<String> for EngineOutput {
    fn from(text: String) -> Self {
        EngineOutput::Text(text)
    }
}

impl From<&str> for EngineOutput {
    fn from(text: &str) -> Self {
        EngineOutput::Text(text.to_string())
    }
}

impl From<Vec<u8>> for EngineOutput {
    fn from(bytes: Vec<u8>) -> Self {
        EngineOutput::from_bytes(bytes)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultEncoder {
    encoding: ResultEncoding,
}

impl ResultEncoder {
    pub fn new(encoding: ResultEncoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> ResultEncoding {
        self.encoding
    }

    pub fn encode(&self, output: EngineOutput) -> Vec<u8> {
        match self.encoding {
            ResultEncoding::CharBytes => to_hex_text(output).into_bytes(),
            ResultEncoding::HexDecoded => decode_hex_pairs(output),
        }
    }
}

pub fn is_hex_text(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Hex text for an engine output: already-hex text is kept as is, anything
/// else is replaced by the hex of its bytes.
fn to_hex_text(output: EngineOutput) -> String {
    match output {
        EngineOutput::Text(text) if is_hex_text(&text) => text,
        EngineOutput::Text(text) => hex::encode(text.as_bytes()),
        EngineOutput::Bytes(bytes) => hex::encode(bytes),
    }
}

/// Byte value of every hex pair; output that is not even-length hex is
/// already the intended bytes.
fn decode_hex_pairs(output: EngineOutput) -> Vec<u8> {
    match output {
        EngineOutput::Text(text) => match hex::decode(&text) {
            Ok(bytes) => bytes,
            Err(_) => text.into_bytes(),
        },
        EngineOutput::Bytes(bytes) => bytes,
    }
}
