use std::io::{self, Write};

/// Erases the current terminal row on stdout's side before the first byte of a record.
const CLEAR_ROW: &[u8] = b"\r\x1b[2K";

/// Stderr writer for one log record.
///
/// When `clear` is set, the live status line drawn on the same terminal is wiped before the
/// record is written; the next status redraw puts it back below the log output.
pub struct StatusAwareStderr<W = io::Stderr> {
    inner: W,
    pending_clear: bool,
}

impl StatusAwareStderr {
    pub fn new(clear: bool) -> Self {
        Self::with_inner(io::stderr(), clear)
    }
}

impl<W: Write> StatusAwareStderr<W> {
    pub fn with_inner(inner: W, clear: bool) -> Self {
        Self {
            inner,
            pending_clear: clear,
        }
    }
}

impl<W: Write> Write for StatusAwareStderr<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.pending_clear && !buf.is_empty() {
            self.inner.write_all(CLEAR_ROW)?;
            self.pending_clear = false;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
