//! Command sinks.
//!
//! A [`Sink`] is the one opaque call through which the host hears about
//! everything. It takes an already-encoded command string and may refuse it,
//! most commonly with [`SinkError::NotReady`] while the host is still starting.

use crate::error::SinkError;
use std::io::Write;

/// Receiver of encoded bridge commands.
pub trait Sink {
    fn send(&mut self, command: &str) -> Result<(), SinkError>;
}

impl<K: Sink + ?Sized> Sink for Box<K> {
    fn send(&mut self, command: &str) -> Result<(), SinkError> {
        (**self).send(command)
    }
}

/// Collects commands in memory.
impl Sink for Vec<String> {
    fn send(&mut self, command: &str) -> Result<(), SinkError> {
        self.push(command.to_string());
        Ok(())
    }
}

/// Writes one command per line and flushes after each.
///
/// Used by the CLI over stdout so a parent process can read commands line by line.
pub struct WriterSink<W: Write> {
    out: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn send(&mut self, command: &str) -> Result<(), SinkError> {
        writeln!(self.out, "{command}")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Adapts a closure into a [`Sink`].
pub struct FnSink<F>(pub F);

impl<F> Sink for FnSink<F>
where
    F: FnMut(&str) -> Result<(), SinkError>,
{
    fn send(&mut self, command: &str) -> Result<(), SinkError> {
        (self.0)(command)
    }
}
