//! Leaf utilities: the centisecond time codec, colour decoding and
//! generic numeric field parsing.
//!
//! The document model stores caption timing as `f64` seconds (what hosts
//! and playback clocks speak), while the wire format and karaoke tags use
//! centiseconds. All conversions between the two live here.

use core::fmt::Display;
use core::str::FromStr;

pub mod errors;

pub use errors::CoreError;

/// Centiseconds per hour in the `H:MM:SS.CC` timecode space.
const CS_PER_HOUR: u32 = 360_000;
/// Centiseconds per minute.
const CS_PER_MINUTE: u32 = 6_000;
/// Centiseconds per second.
const CS_PER_SECOND: u32 = 100;

/// Parse an `H:MM:SS.CC` timecode to centiseconds.
///
/// Accepts one- or two-digit fractions (`.5` means 50cs). Hours carry no
/// digit limit; minutes and seconds must be below 60.
///
/// # Example
///
/// ```rust
/// # use reelsub_core::utils::parse_timecode;
/// assert_eq!(parse_timecode("0:01:30.50")?, 9050);
/// # Ok::<(), reelsub_core::utils::CoreError>(())
/// ```
///
/// # Errors
///
/// Returns [`CoreError::InvalidTime`] when the string is not a valid
/// timecode.
pub fn parse_timecode(time_str: &str) -> Result<u32, CoreError> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 3 {
        return Err(CoreError::invalid_time(time_str, "expected H:MM:SS.CC"));
    }

    let hours: u32 = parts[0]
        .parse()
        .map_err(|_| CoreError::invalid_time(time_str, "invalid hours"))?;
    let minutes: u32 = parts[1]
        .parse()
        .map_err(|_| CoreError::invalid_time(time_str, "invalid minutes"))?;

    let seconds_parts: Vec<&str> = parts[2].split('.').collect();
    let seconds: u32 = seconds_parts[0]
        .parse()
        .map_err(|_| CoreError::invalid_time(time_str, "invalid seconds"))?;

    let centiseconds = if seconds_parts.len() > 1 {
        let frac_str = seconds_parts[1];
        let frac_val: u32 = frac_str
            .parse()
            .map_err(|_| CoreError::invalid_time(time_str, "invalid centiseconds"))?;
        match frac_str.len() {
            1 => frac_val * 10,
            2 => frac_val,
            _ => {
                return Err(CoreError::invalid_time(
                    time_str,
                    "too many decimal places",
                ))
            }
        }
    } else {
        0
    };

    if minutes >= 60 {
        return Err(CoreError::invalid_time(time_str, "minutes must be < 60"));
    }
    if seconds >= 60 {
        return Err(CoreError::invalid_time(time_str, "seconds must be < 60"));
    }

    Ok(hours * CS_PER_HOUR + minutes * CS_PER_MINUTE + seconds * CS_PER_SECOND + centiseconds)
}

/// Format centiseconds back to the `H:MM:SS.CC` timecode form.
#[must_use]
pub fn format_timecode(centiseconds: u32) -> String {
    let hours = centiseconds / CS_PER_HOUR;
    let remainder = centiseconds % CS_PER_HOUR;
    let minutes = remainder / CS_PER_MINUTE;
    let remainder = remainder % CS_PER_MINUTE;
    let seconds = remainder / CS_PER_SECOND;
    let cs = remainder % CS_PER_SECOND;

    format!("{hours}:{minutes:02}:{seconds:02}.{cs:02}")
}

/// Convert floating-point seconds to centiseconds, rounding to the
/// format's native precision. Negative inputs clamp to zero.
#[must_use]
pub fn seconds_to_cs(seconds: f64) -> u32 {
    if seconds <= 0.0 {
        return 0;
    }
    // u32 covers ~497 days of centiseconds; playback times never get close.
    (seconds * 100.0).round() as u32
}

/// Convert centiseconds to floating-point seconds.
#[must_use]
pub fn cs_to_seconds(centiseconds: u32) -> f64 {
    f64::from(centiseconds) / 100.0
}

/// Parse a `&HAABBGGRR&` / `&HBBGGRR&` colour value to RGBA bytes.
///
/// The format stores colours as BGR with an optional inverted-alpha
/// prefix (00 = opaque). Output is `[r, g, b, a]` with conventional
/// alpha (255 = opaque).
///
/// # Errors
///
/// Returns [`CoreError::InvalidColour`] for malformed values.
pub fn parse_bgr_colour(colour_str: &str) -> Result<[u8; 4], CoreError> {
    let hex = colour_str
        .trim()
        .trim_start_matches("&H")
        .trim_start_matches("&h")
        .trim_end_matches('&');

    if hex.is_empty() || hex.len() > 8 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidColour(colour_str.into()));
    }

    let value = u32::from_str_radix(hex, 16)
        .map_err(|_| CoreError::InvalidColour(colour_str.into()))?;

    let b = ((value >> 16) & 0xFF) as u8;
    let g = ((value >> 8) & 0xFF) as u8;
    let r = (value & 0xFF) as u8;
    // Inverted alpha in the upper byte; absent means fully opaque.
    let a = 255 - ((value >> 24) & 0xFF) as u8;

    Ok([r, g, b, a])
}

/// Parse a numeric field value, trimming surrounding whitespace.
///
/// # Errors
///
/// Returns [`CoreError::InvalidNumeric`] when the value does not parse
/// as the requested type.
pub fn parse_numeric<T>(value_str: &str) -> Result<T, CoreError>
where
    T: FromStr,
    T::Err: Display,
{
    value_str
        .trim()
        .parse()
        .map_err(|e: T::Err| CoreError::invalid_numeric(value_str, e.to_string()))
}
