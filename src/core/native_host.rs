//! Native messaging host: serves the message contract over stdin/stdout.
//!
//! Frames are a u32 length in native (little-endian) byte order followed by that many bytes
//! of UTF-8 JSON, in both directions. Messages are answered one at a time, in order.
//! EOF before a frame header ends the session.

use std::io::{self, Read, Write};

use crate::core::message::{MessageHandler, Response};

/// Largest inbound message accepted.
pub const MAX_INBOUND_BYTES: u32 = 64 * 1024 * 1024;

/// Browsers reject host replies larger than 1 MiB.
pub const MAX_OUTBOUND_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Native messaging I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Inbound message of {0} bytes exceeds the limit")]
    TooLarge(u32),
    #[error("Failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read one frame. `Ok(None)` on clean EOF before the header.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>, HostError> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated frame header").into());
        }
        filled += n;
    }

    let len = u32::from_le_bytes(header);
    if len > MAX_INBOUND_BYTES {
        return Err(HostError::TooLarge(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

/// Write one reply frame and flush.
pub fn write_frame<W: Write>(writer: &mut W, response: &Response) -> Result<(), HostError> {
    let mut payload = serde_json::to_vec(response)?;
    if payload.len() > MAX_OUTBOUND_BYTES {
        log::warn!("Reply of {} bytes exceeds the browser limit", payload.len());
        payload = serde_json::to_vec(&Response::error("Explanation too large to deliver"))?;
    }
    let len = payload.len() as u32;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Answer frames from `reader` until EOF. Returns the number of messages handled.
pub async fn serve<R: Read, W: Write>(
    handler: &MessageHandler,
    reader: &mut R,
    writer: &mut W,
) -> Result<usize, HostError> {
    let mut handled = 0;
    while let Some(frame) = read_frame(reader)? {
        let response = handler.handle_json(&frame).await;
        write_frame(writer, &response)?;
        handled += 1;
    }
    log::info!("Native host session ended after {} message(s)", handled);
    Ok(handled)
}
