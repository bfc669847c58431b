// ABOUTME: Framed PDU transport over an abstract duplex byte stream
// ABOUTME: Performs the two-read framed receive and buffered frame writes

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, trace};

use crate::client::{SmppError, SmppResult};
use crate::codec::{frame_length, DecodeError, PduHeader, MAX_PDU_SIZE};
use crate::pdu::Pdu;

/// Framed PDU transport.
///
/// Generic over any duplex byte stream; `TcpStream` is the expected substrate
/// but nothing here depends on TCP specifics, so tests run over in-memory
/// duplex pipes. Reads accumulate in a persistent buffer, which keeps
/// `read_frame` safe to cancel (a timed-out read loses no partial frame);
/// writes go through a `BufWriter` and are flushed once per frame so each PDU
/// leaves in a single burst.
#[derive(Debug)]
pub struct Connection<S> {
    stream: BufWriter<S>,
    buffer: BytesMut,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S) -> Self {
        Connection {
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Read one complete frame and parse it.
    ///
    /// Blocks until a whole PDU has arrived: the four length-prefix octets
    /// announce the frame size, then reads accumulate until the frame is
    /// complete, however TCP fragments it. Returns `None` when the peer
    /// closed the stream on a frame boundary; a close mid-frame is a
    /// connection error.
    pub async fn read_frame(&mut self) -> SmppResult<Option<Pdu>> {
        loop {
            if let Some(pdu) = self.parse_frame()? {
                return Ok(Some(pdu));
            }
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(SmppError::ConnectionClosed);
            }
        }
    }

    /// Parse one frame out of the buffer, or report that more data is needed.
    fn parse_frame(&mut self) -> SmppResult<Option<Pdu>> {
        if self.buffer.len() < 4 {
            return Ok(None);
        }
        let length = frame_length(&[
            self.buffer[0],
            self.buffer[1],
            self.buffer[2],
            self.buffer[3],
        ]);
        if length < PduHeader::SIZE as u32 || length > MAX_PDU_SIZE {
            return Err(DecodeError::InvalidCommandLength {
                length,
                min: PduHeader::SIZE as u32,
                max: MAX_PDU_SIZE,
            }
            .into());
        }
        if self.buffer.len() < length as usize {
            return Ok(None);
        }

        let raw = self.buffer.split_to(length as usize);
        trace!(octets = raw.len(), "frame read");
        let pdu = Pdu::parse(&raw)?;
        Ok(Some(pdu))
    }

    /// Serialize and write one frame, flushing the write buffer.
    pub async fn write_frame(&mut self, pdu: &mut Pdu) -> SmppResult<()> {
        let bytes = pdu.to_bytes()?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        debug!(
            command = pdu.command_name(),
            sequence = pdu.sequence_number,
            octets = bytes.len(),
            "frame written"
        );
        Ok(())
    }

    /// Shut down the write side of the stream.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::CommandId;

    #[tokio::test]
    async fn frame_roundtrip_over_duplex() {
        let (a, b) = tokio::io::duplex(1024);
        let mut left = Connection::new(a);
        let mut right = Connection::new(b);

        let mut pdu = Pdu::new(CommandId::EnquireLink);
        pdu.sequence_number = 42;
        left.write_frame(&mut pdu).await.unwrap();

        let received = right.read_frame().await.unwrap().unwrap();
        assert_eq!(received.command_id(), CommandId::EnquireLink);
        assert_eq!(received.sequence_number, 42);
    }

    #[tokio::test]
    async fn fragmented_frames_are_reassembled() {
        let (mut a, b) = tokio::io::duplex(1024);
        let mut right = Connection::new(b);

        let mut pdu = Pdu::new(CommandId::Unbind);
        pdu.sequence_number = 7;
        let bytes = pdu.to_bytes().unwrap();

        let writer = tokio::spawn(async move {
            // dribble the frame out two octets at a time
            for chunk in bytes.chunks(2) {
                a.write_all(chunk).await.unwrap();
                a.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
            a
        });

        let received = right.read_frame().await.unwrap().unwrap();
        assert_eq!(received.command_id(), CommandId::Unbind);
        assert_eq!(received.sequence_number, 7);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn clean_close_reads_none() {
        let (a, b) = tokio::io::duplex(64);
        drop(a);
        let mut conn = Connection::new(b);
        assert!(conn.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversize_length_prefix_is_rejected() {
        let (mut a, b) = tokio::io::duplex(64);
        a.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).await.unwrap();
        let mut conn = Connection::new(b);
        assert!(matches!(
            conn.read_frame().await,
            Err(SmppError::Decode(DecodeError::InvalidCommandLength { .. }))
        ));
    }
}
