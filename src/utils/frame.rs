use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    InvalidDigit(char),
    /// Number of bits given
    InvalidLength(u32),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::InvalidDigit(c) => write!(f, "Invalid hex digit '{}' in frame", c),
            FrameError::InvalidLength(bits) => {
                write!(f, "Invalid frame length, {} bits instead of 16", bits)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// A forward frame typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLine {
    pub frame: [u8; 2],
    pub twice: bool,
}

/// Parse a hex string like `"ff 05"` into a forward frame
pub fn parse_frame(s: &str) -> Result<[u8; 2], FrameError> {
    let mut frame = 0u32;
    let mut frame_len = 0;
    for c in s.chars() {
        if c.is_whitespace() {
            // Skip
        } else if let Some(d) = c.to_digit(16) {
            frame = (frame << 4) | d;
            frame_len += 4;
            if frame_len > 16 {
                break;
            }
        } else {
            return Err(FrameError::InvalidDigit(c));
        }
    }
    if frame_len != 16 {
        return Err(FrameError::InvalidLength(frame_len));
    }
    Ok([(frame >> 8) as u8, frame as u8])
}

/// Parse a frame optionally followed by the word `twice`
pub fn parse_line(line: &str) -> Result<FrameLine, FrameError> {
    let line = line.trim();
    match line.strip_suffix("twice") {
        Some(hex) => Ok(FrameLine {
            frame: parse_frame(hex)?,
            twice: true,
        }),
        None => Ok(FrameLine {
            frame: parse_frame(line)?,
            twice: false,
        }),
    }
}
