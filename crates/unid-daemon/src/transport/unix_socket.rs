use std::io::BufRead;
use std::io::BufReader;
use std::io::ErrorKind;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use unid_ipc::RpcRequest;
use unid_ipc::RpcResponse;

use super::TransportConnection;
use super::TransportError;
use super::TransportListener;

/// Line reader that enforces a cumulative per-connection byte budget.
struct BoundedLineReader<R> {
    inner: R,
    max_bytes: usize,
    bytes_read: usize,
}

impl<R> BoundedLineReader<R> {
    fn new(inner: R, max_bytes: usize) -> Self {
        Self {
            inner,
            max_bytes,
            bytes_read: 0,
        }
    }
}

impl<R: BufRead> BoundedLineReader<R> {
    /// Reads one line, counting bytes chunk by chunk so an oversized
    /// request is rejected as it arrives rather than after it has been
    /// buffered whole.
    fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        let mut buf = Vec::new();
        loop {
            let (consumed, found_newline) = {
                let available = match self.inner.fill_buf() {
                    Ok(chunk) => chunk,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(TransportError::from(e)),
                };
                if available.is_empty() {
                    if buf.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
                match available.iter().position(|&b| b == b'\n') {
                    Some(pos) => {
                        buf.extend_from_slice(&available[..pos]);
                        (pos + 1, true)
                    }
                    None => {
                        buf.extend_from_slice(available);
                        (available.len(), false)
                    }
                }
            };
            self.inner.consume(consumed);
            self.bytes_read += consumed;
            if self.bytes_read > self.max_bytes {
                return Err(TransportError::SizeLimit {
                    max_bytes: self.max_bytes,
                });
            }
            if found_newline {
                break;
            }
        }

        let mut line = String::from_utf8(buf)
            .map_err(|e| TransportError::Parse(format!("invalid utf-8 in request: {}", e)))?;
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

pub struct UnixSocketConnection {
    reader: BoundedLineReader<BufReader<UnixStream>>,
    writer: UnixStream,
}

impl UnixSocketConnection {
    pub fn new(stream: UnixStream, max_request_bytes: usize) -> Result<Self, TransportError> {
        // Accepted sockets inherit nonblocking mode from the listener;
        // timeouts only work on blocking sockets.
        let _ = stream.set_nonblocking(false);
        let reader_stream = stream.try_clone()?;
        Ok(Self {
            reader: BoundedLineReader::new(BufReader::new(reader_stream), max_request_bytes),
            writer: stream,
        })
    }
}

impl TransportConnection for UnixSocketConnection {
    fn read_request(&mut self) -> Result<RpcRequest, TransportError> {
        loop {
            match self.reader.read_line()? {
                None => return Err(TransportError::ConnectionClosed),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    return serde_json::from_str(&line)
                        .map_err(|e| TransportError::Parse(e.to_string()));
                }
            }
        }
    }

    fn write_response(&mut self, response: &RpcResponse) -> Result<(), TransportError> {
        let json = serde_json::to_string(response)
            .map_err(|e| TransportError::Parse(format!("Failed to serialize response: {}", e)))?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        self.writer.set_read_timeout(timeout)?;
        Ok(())
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        self.writer.set_write_timeout(timeout)?;
        Ok(())
    }
}

pub struct UnixSocketListener {
    inner: UnixListener,
    max_request_bytes: usize,
}

impl UnixSocketListener {
    pub fn bind(path: &Path, max_request_bytes: usize) -> Result<Self, TransportError> {
        let listener = UnixListener::bind(path)?;
        Ok(Self {
            inner: listener,
            max_request_bytes,
        })
    }
}

impl TransportListener for UnixSocketListener {
    type Connection = UnixSocketConnection;

    fn accept(&self) -> Result<Self::Connection, TransportError> {
        let (stream, _addr) = self.inner.accept()?;
        UnixSocketConnection::new(stream, self.max_request_bytes)
    }

    fn set_nonblocking(&self, nonblocking: bool) -> Result<(), TransportError> {
        self.inner.set_nonblocking(nonblocking)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::io::Read;
    use std::rc::Rc;

    #[test]
    fn test_bounded_reader_within_budget() {
        let cursor = Cursor::new("hello\nworld\n");
        let mut reader = BoundedLineReader::new(BufReader::new(cursor), 100);

        assert_eq!(reader.read_line().unwrap(), Some("hello".to_string()));
        assert_eq!(reader.read_line().unwrap(), Some("world".to_string()));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn test_bounded_reader_exceeds_budget() {
        let cursor = Cursor::new("this line is longer than the byte budget allows\n");
        let mut reader = BoundedLineReader::new(BufReader::new(cursor), 10);

        assert!(matches!(
            reader.read_line(),
            Err(TransportError::SizeLimit { max_bytes: 10 })
        ));
    }

    #[test]
    fn test_bounded_reader_budget_is_cumulative() {
        let cursor = Cursor::new("aaa\nbbb\nccc\n");
        let mut reader = BoundedLineReader::new(BufReader::new(cursor), 8);

        assert_eq!(reader.read_line().unwrap(), Some("aaa".to_string()));
        assert_eq!(reader.read_line().unwrap(), Some("bbb".to_string()));
        assert!(matches!(
            reader.read_line(),
            Err(TransportError::SizeLimit { .. })
        ));
    }

    struct CountingReader {
        data: Cursor<Vec<u8>>,
        consumed: Rc<Cell<usize>>,
    }

    impl Read for CountingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.data.read(buf)?;
            self.consumed.set(self.consumed.get() + n);
            Ok(n)
        }
    }

    #[test]
    fn test_oversized_line_rejected_before_fully_buffered() {
        let payload = vec![b'x'; 1_000_000];
        let total = payload.len();
        let consumed = Rc::new(Cell::new(0));
        let source = CountingReader {
            data: Cursor::new(payload),
            consumed: Rc::clone(&consumed),
        };
        let mut reader = BoundedLineReader::new(BufReader::new(source), 64);

        assert!(matches!(
            reader.read_line(),
            Err(TransportError::SizeLimit { max_bytes: 64 })
        ));
        // Rejection must come from the byte count, not from draining
        // the whole newline-less payload first.
        assert!(consumed.get() < total / 10);
    }

    #[test]
    fn test_bounded_reader_strips_crlf() {
        let cursor = Cursor::new("line with crlf\r\n");
        let mut reader = BoundedLineReader::new(BufReader::new(cursor), 100);

        assert_eq!(
            reader.read_line().unwrap(),
            Some("line with crlf".to_string())
        );
    }

    #[test]
    fn test_transport_error_from_io_kinds() {
        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert!(matches!(
            TransportError::from(timeout),
            TransportError::Timeout
        ));

        let would_block = std::io::Error::new(std::io::ErrorKind::WouldBlock, "would block");
        assert!(matches!(
            TransportError::from(would_block),
            TransportError::Timeout
        ));

        let eof = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        assert!(matches!(
            TransportError::from(eof),
            TransportError::ConnectionClosed
        ));

        let broken_pipe = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken");
        assert!(matches!(
            TransportError::from(broken_pipe),
            TransportError::ConnectionClosed
        ));

        let other = std::io::Error::other("other");
        assert!(matches!(TransportError::from(other), TransportError::Io(_)));
    }

    #[test]
    fn test_read_request_skips_blank_lines() {
        use std::thread;

        let (client, server) = UnixStream::pair().unwrap();
        let mut conn = UnixSocketConnection::new(server, 1024).unwrap();

        let writer = thread::spawn(move || {
            let mut client = client;
            writeln!(client).unwrap();
            writeln!(client, r#"{{"jsonrpc":"2.0","id":3,"method":"getUnixId"}}"#).unwrap();
        });

        let request = conn.read_request().unwrap();
        assert_eq!(request.id, 3);
        assert_eq!(request.method, "getUnixId");
        writer.join().unwrap();
    }

    #[test]
    fn test_read_request_on_closed_peer() {
        let (client, server) = UnixStream::pair().unwrap();
        drop(client);

        let mut conn = UnixSocketConnection::new(server, 1024).unwrap();
        assert!(matches!(
            conn.read_request(),
            Err(TransportError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_write_response_round_trip() {
        let (client, server) = UnixStream::pair().unwrap();
        let mut conn = UnixSocketConnection::new(server, 1024).unwrap();

        let response = RpcResponse::success(9, serde_json::json!({ "unix_id": "abc123" }));
        conn.write_response(&response).unwrap();
        drop(conn);

        let mut line = String::new();
        BufReader::new(client).read_line(&mut line).unwrap();
        assert!(line.contains("\"id\":9"));
        assert!(line.contains("abc123"));
    }
}
