//! Single-frame reader for `multipart/x-mixed-replace` JPEG streams
//!
//! The live feed never ends, so a frame grab reads until the first complete
//! part is buffered and then drops the connection.

use crate::{StationError, StationResult};
use std::io::Read;

pub const DEFAULT_BOUNDARY: &str = "frame";

/// Upper bound on bytes buffered while looking for one frame
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

const READ_CHUNK: usize = 16 * 1024;

/// Boundary parameter of a multipart content type, if the stream is multipart
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    let mut parts = content_type.split(';');
    let mime = parts.next()?.trim().to_ascii_lowercase();
    if !mime.starts_with("multipart/") {
        return None;
    }
    let boundary = parts
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| DEFAULT_BOUNDARY.to_string());
    // Some servers already include the leading dashes in the parameter
    Some(boundary.trim_start_matches("--").to_string())
}

/// Read the body of the first part of a multipart stream
pub fn read_first_part<R: Read>(mut reader: R, boundary: &str, limit: usize) -> StationResult<Vec<u8>> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            return finish_at_eof(&buf, &delimiter);
        }
        buf.extend_from_slice(&chunk[..read]);

        if let Some(frame) = extract_part(&buf, &delimiter) {
            return Ok(frame.to_vec());
        }
        if buf.len() > limit {
            return Err(StationError::FrameGrab(format!(
                "no complete frame within {} bytes",
                limit
            )));
        }
    }
}

fn extract_part<'a>(buf: &'a [u8], delimiter: &[u8]) -> Option<&'a [u8]> {
    let (body_start, content_length) = part_body_start(buf, delimiter)?;

    if let Some(len) = content_length {
        let end = body_start.checked_add(len)?;
        return buf.get(body_start..end);
    }

    let mut closing = b"\r\n".to_vec();
    closing.extend_from_slice(delimiter);
    let end = find(buf, &closing, body_start)?;
    Some(&buf[body_start..end])
}

/// Offset of the first part's body and its declared length
fn part_body_start(buf: &[u8], delimiter: &[u8]) -> Option<(usize, Option<usize>)> {
    let start = find(buf, delimiter, 0)?;
    let headers_end = find(buf, b"\r\n\r\n", start)?;
    let headers = String::from_utf8_lossy(&buf[start + delimiter.len()..headers_end]);

    let content_length = headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse::<usize>().ok()
        } else {
            None
        }
    });

    Some((headers_end + 4, content_length))
}

fn finish_at_eof(buf: &[u8], delimiter: &[u8]) -> StationResult<Vec<u8>> {
    if let Some(frame) = extract_part(buf, delimiter) {
        return Ok(frame.to_vec());
    }
    match part_body_start(buf, delimiter) {
        Some((body_start, None)) if body_start < buf.len() => {
            let body = &buf[body_start..];
            let body = body.strip_suffix(b"\r\n").unwrap_or(body);
            Ok(body.to_vec())
        }
        _ => Err(StationError::FrameGrab(
            "stream ended before a complete frame".to_string(),
        )),
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0x01, 0x02, 0x03, 0xFF, 0xD9];

    fn stream(parts: usize) -> Vec<u8> {
        let mut data = Vec::new();
        for _ in 0..parts {
            data.extend_from_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
            data.extend_from_slice(JPEG);
            data.extend_from_slice(b"\r\n");
        }
        data
    }

    /// Reader that hands out a few bytes at a time
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = 3.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_first_part_of_running_stream() {
        let frame = read_first_part(Cursor::new(stream(3)), "frame", MAX_FRAME_BYTES).unwrap();
        assert_eq!(frame, JPEG);
    }

    #[test]
    fn test_small_reads() {
        let reader = Trickle {
            data: stream(2),
            pos: 0,
        };
        let frame = read_first_part(reader, "frame", MAX_FRAME_BYTES).unwrap();
        assert_eq!(frame, JPEG);
    }

    #[test]
    fn test_content_length_header() {
        let mut data = b"--frame\r\nContent-Type: image/jpeg\r\nContent-Length: 7\r\n\r\n".to_vec();
        data.extend_from_slice(JPEG);
        data.extend_from_slice(b"trailing garbage");
        let frame = read_first_part(Cursor::new(data), "frame", MAX_FRAME_BYTES).unwrap();
        assert_eq!(frame, JPEG);
    }

    #[test]
    fn test_oversized_content_length() {
        let mut data = format!(
            "--frame\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            usize::MAX
        )
        .into_bytes();
        data.extend_from_slice(JPEG);
        let err = read_first_part(Cursor::new(data), "frame", MAX_FRAME_BYTES).unwrap_err();
        assert!(matches!(err, StationError::FrameGrab(_)));
    }

    #[test]
    fn test_single_part_then_eof() {
        let frame = read_first_part(Cursor::new(stream(1)), "frame", MAX_FRAME_BYTES).unwrap();
        assert_eq!(frame, JPEG);
    }

    #[test]
    fn test_truncated_stream() {
        let data = b"--frame\r\nContent-Type: image/jpeg\r\n".to_vec();
        let err = read_first_part(Cursor::new(data), "frame", MAX_FRAME_BYTES).unwrap_err();
        assert!(matches!(err, StationError::FrameGrab(_)));
    }

    #[test]
    fn test_limit() {
        let data = vec![0u8; 4096];
        let err = read_first_part(Cursor::new(data), "frame", 1024).unwrap_err();
        assert!(matches!(err, StationError::FrameGrab(_)));
    }

    #[test]
    fn test_boundary_parsing() {
        assert_eq!(
            boundary_from_content_type("multipart/x-mixed-replace; boundary=frame").as_deref(),
            Some("frame")
        );
        assert_eq!(
            boundary_from_content_type("multipart/x-mixed-replace;boundary=\"--cam\"").as_deref(),
            Some("cam")
        );
        assert_eq!(
            boundary_from_content_type("multipart/x-mixed-replace").as_deref(),
            Some("frame")
        );
        assert_eq!(boundary_from_content_type("image/jpeg"), None);
    }
}
