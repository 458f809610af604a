use std::io;
use std::io::Write;

/// Magic bytes that open a headered binary image.
pub const IMAGE_MAGIC: [u8; 4] = *b"MIPS";

/// Length of the optional header: magic plus a little-endian entry word.
pub const IMAGE_HEADER_LEN: usize = 8;

/// A flat binary image, optionally preceded by a `"MIPS"` header naming
/// the entry address. The body is loaded at address 0 either way.
#[derive(Debug, Default)]
pub struct Image {
    pub entry: Option<u32>,
    pub body: Vec<u8>,
}

impl Image {
    /// Probe the input for the optional header and split it off.
    pub fn from_bytes(mut bytes: Vec<u8>) -> Self {
        if bytes.len() >= IMAGE_HEADER_LEN && bytes[..4] == IMAGE_MAGIC {
            let entry = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
            bytes.drain(..IMAGE_HEADER_LEN);

            Image {
                entry: Some(entry),
                body: bytes,
            }
        } else {
            Image {
                entry: None,
                body: bytes,
            }
        }
    }

    /// Write the image, emitting the header only when an entry is set.
    pub fn write<W: Write>(&self, output: &mut W) -> io::Result<()> {
        if let Some(entry) = self.entry {
            output.write_all(&IMAGE_MAGIC)?;
            output.write_all(&entry.to_le_bytes())?;
        }

        output.write_all(&self.body)
    }
}
