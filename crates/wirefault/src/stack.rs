// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call-stack capture with deferred symbolization.

use std::ffi::c_void;
use std::fmt;

/// Maximum number of frames a capture records.
pub const MAX_DEPTH: usize = 32;

/// One captured call-stack entry, held as a raw instruction pointer.
///
/// Function name, file, and line resolve lazily on each query; an
/// unresolvable frame yields empty strings and a zero line.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame(usize);

impl Frame {
    /// Raw instruction pointer of this frame.
    #[must_use]
    pub fn ip(&self) -> usize {
        self.0
    }

    /// Resolved function name, or `""`.
    #[must_use]
    pub fn function(&self) -> String {
        self.symbol(|symbol| symbol.name().map(|name| name.to_string()))
    }

    /// Resolved source file, or `""`.
    #[must_use]
    pub fn file(&self) -> String {
        self.symbol(|symbol| symbol.filename().map(|path| path.display().to_string()))
    }

    /// Resolved source line, or `0`.
    #[must_use]
    pub fn line(&self) -> u32 {
        let mut line = 0;
        backtrace::resolve(self.0 as *mut c_void, |symbol| {
            if line == 0 {
                if let Some(resolved) = symbol.lineno() {
                    line = resolved;
                }
            }
        });
        line
    }

    fn symbol(&self, pick: impl Fn(&backtrace::Symbol) -> Option<String>) -> String {
        let mut out = None;
        backtrace::resolve(self.0 as *mut c_void, |symbol| {
            if out.is_none() {
                out = pick(symbol);
            }
        });
        out.unwrap_or_default()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({:#x})", self.0)
    }
}

/// An ordered capture of caller frames, most recent call first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackTrace {
    frames: Vec<Frame>,
}

impl StackTrace {
    /// The captured frames, most recent call first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of captured frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, frame) in self.frames.iter().enumerate() {
            if index != 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}\n\t{}:{}", frame.function(), frame.file(), frame.line())?;
        }
        Ok(())
    }
}

/// Captures up to [`MAX_DEPTH`] caller frames above `skip`.
///
/// Skipping is best effort: inlining can shift frame boundaries. Capture
/// itself never fails; at worst the trace is empty.
#[must_use]
pub fn capture(skip: usize) -> StackTrace {
    let mut frames = Vec::new();
    // The walk sees its own callback and this function before any caller.
    let mut remaining_skip = skip + 2;
    backtrace::trace(|frame| {
        if remaining_skip > 0 {
            remaining_skip -= 1;
            return true;
        }
        frames.push(Frame(frame.ip() as usize));
        frames.len() < MAX_DEPTH
    });
    StackTrace { frames }
}
