//! Line I/O with the engine subprocess.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::ChildStdin;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::{Error, Result};

/// Writes request lines to the engine stdin.
pub struct ProcessWriter {
    stdin: ChildStdin,
}

impl ProcessWriter {
    /// Create a new writer from a child process stdin.
    pub fn new(stdin: ChildStdin) -> Self {
        Self { stdin }
    }

    /// Write one line and flush it.
    ///
    /// `line` must already end with `\n`.
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.stdin.write_all(line).map_err(Error::io)?;
        self.stdin.flush().map_err(Error::io)?;
        Ok(())
    }
}

/// Reads reply lines from the engine.
///
/// Each output stream of the child is drained by its own thread into a
/// shared channel, which both merges stderr into stdout and lets a read wait
/// with a timeout. The channel disconnects once every stream hit EOF.
///
/// Lines keep their order within one stream, but lines from stdout and
/// stderr may interleave in any order relative to each other.
pub struct ProcessReader {
    lines: Receiver<std::io::Result<Vec<u8>>>,
    timeout: Option<Duration>,
}

impl ProcessReader {
    /// Create a reader over the given streams.
    pub fn spawn<I>(streams: I, timeout: Option<Duration>) -> Self
    where
        I: IntoIterator,
        I::Item: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        for stream in streams {
            let tx = tx.clone();
            thread::spawn(move || forward_lines(stream, tx));
        }
        Self {
            lines: rx,
            timeout,
        }
    }

    /// Read the next line, including its trailing newline if it had one.
    ///
    /// # Errors
    ///
    /// - [`Error::StreamClosed`] if the engine closed all its output streams
    /// - [`Error::Timeout`] if a timeout is set and nothing arrived in time
    /// - [`Error::Io`] if reading from the pipe failed
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        let received = match self.timeout {
            Some(timeout) => self.lines.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => Error::Timeout(timeout),
                RecvTimeoutError::Disconnected => Error::StreamClosed,
            })?,
            None => self.lines.recv().map_err(|_| Error::StreamClosed)?,
        };
        received.map_err(Error::io)
    }
}

fn forward_lines<R: Read>(stream: R, tx: Sender<std::io::Result<Vec<u8>>>) {
    let mut reader = BufReader::new(stream);
    loop {
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return,
            Ok(_) => {
                if tx.send(Ok(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}
