use parking_lot::Mutex;
use std::io::{self, Write};

/// Serialized access to the two output streams.
///
/// Event handlers may run on a runtime worker while the main flow also
/// prints, so every write goes through a lock and is flushed immediately.
pub struct Console {
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
        }
    }

    /// Console bound to the process stdout and stderr
    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Write to stdout without a trailing newline
    pub fn print(&self, text: &str) {
        write_flushed(&mut **self.out.lock(), text);
    }

    pub fn println(&self, text: &str) {
        let mut out = self.out.lock();
        write_flushed(&mut **out, text);
        write_flushed(&mut **out, "\n");
    }

    pub fn eprintln(&self, text: &str) {
        let mut err = self.err.lock();
        write_flushed(&mut **err, text);
        write_flushed(&mut **err, "\n");
    }
}

fn write_flushed(writer: &mut dyn Write, text: &str) {
    // A closed pipe must not take the session down with it.
    if writer.write_all(text.as_bytes()).is_ok() {
        let _ = writer.flush();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::SharedBuffer;
    use super::*;

    #[test]
    fn test_streams_are_separate() {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let console = Console::new(Box::new(out.clone()), Box::new(err.clone()));

        console.print("Hello, ");
        console.print("world");
        console.println("!");
        console.eprintln("Error: nope");

        assert_eq!(out.contents(), "Hello, world!\n");
        assert_eq!(err.contents(), "Error: nope\n");
    }
}
