use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants::MAX_FRAME_LENGTH;

/// Reads the next newline-delimited frame, without the delimiter.
/// Returns `Ok(None)` once the stream is closed.
pub async fn read_frame<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    // Bound the read so a peer that never sends a newline can't make us
    // allocate without limit.
    let mut limited = reader.take((MAX_FRAME_LENGTH as u64) + 2);
    let n = limited.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    if line.len() > MAX_FRAME_LENGTH {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame exceeds maximum allowed length of {MAX_FRAME_LENGTH} bytes"),
        ));
    }
    Ok(Some(line))
}

/// Writes one frame and its delimiter in a single chunk, then flushes.
pub async fn write_frame<W>(writer: &mut W, frame: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    if frame.contains('\n') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame contains a newline",
        ));
    }
    if frame.len() > MAX_FRAME_LENGTH {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame exceeds maximum allowed length of {MAX_FRAME_LENGTH} bytes"),
        ));
    }
    let mut buf = Vec::with_capacity(frame.len() + 1);
    buf.extend_from_slice(frame.as_bytes());
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncWriteExt, BufReader, duplex};

    use super::{read_frame, write_frame};
    use crate::constants::MAX_FRAME_LENGTH;

    #[tokio::test]
    async fn write_and_read() {
        let (mut tx, rx) = duplex(4096);
        let mut reader = BufReader::new(rx);
        write_frame(&mut tx, "PLAYER_TURN:alice").await.unwrap();
        assert_eq!(
            read_frame(&mut reader).await.unwrap(),
            Some("PLAYER_TURN:alice".to_string())
        );
    }

    #[tokio::test]
    async fn read_multiple_frames_in_order() {
        let (mut tx, rx) = duplex(4096);
        let mut reader = BufReader::new(rx);
        for frame in ["first", "second", "third"] {
            write_frame(&mut tx, frame).await.unwrap();
        }
        for frame in ["first", "second", "third"] {
            assert_eq!(read_frame(&mut reader).await.unwrap().as_deref(), Some(frame));
        }
    }

    #[tokio::test]
    async fn read_frame_handles_crlf() {
        let (mut tx, rx) = duplex(4096);
        let mut reader = BufReader::new(rx);
        tx.write_all(b"TURN_WINNER:bob\r\n").await.unwrap();
        assert_eq!(
            read_frame(&mut reader).await.unwrap(),
            Some("TURN_WINNER:bob".to_string())
        );
    }

    #[tokio::test]
    async fn eof_yields_none() {
        let (tx, rx) = duplex(4096);
        let mut reader = BufReader::new(rx);
        drop(tx);
        assert_eq!(read_frame(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reject_oversized_frame() {
        let (mut tx, rx) = duplex(MAX_FRAME_LENGTH * 2);
        let mut reader = BufReader::new(rx);
        let monster = "x".repeat(MAX_FRAME_LENGTH + 1);
        tokio::spawn(async move {
            let _ = tx.write_all(monster.as_bytes()).await;
            let _ = tx.write_all(b"\n").await;
        });
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn refuse_to_write_embedded_newline() {
        let (mut tx, _rx) = duplex(4096);
        assert!(write_frame(&mut tx, "CHAT:hi\nKICKED").await.is_err());
    }

    #[tokio::test]
    async fn empty_frame_roundtrips() {
        let (mut tx, rx) = duplex(4096);
        let mut reader = BufReader::new(rx);
        write_frame(&mut tx, "").await.unwrap();
        assert_eq!(read_frame(&mut reader).await.unwrap(), Some(String::new()));
    }
}
