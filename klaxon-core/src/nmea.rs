//! ## klaxon-core::nmea
//! GGA fix parser for GPS receivers that feed the location file.
//!
//! Only the position fields of `$GPGGA` / `$GNGGA` sentences are decoded.
//! Receivers sometimes pad their serial output with NUL bytes; those are
//! dropped before parsing.

use thiserror::Error;

/// Errors that can occur while parsing a GGA sentence.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum NmeaError {
    #[error("not a GGA sentence")]
    NotGga,
    #[error("GGA sentence has too few fields")]
    Truncated,
    #[error("checksum mismatch: expected {expected:02X}, computed {computed:02X}")]
    Checksum { expected: u8, computed: u8 },
    #[error("malformed {0} field")]
    Malformed(&'static str),
    #[error("receiver reports no fix")]
    NoFix,
    #[error("no GGA fix found in capture")]
    NotFound,
}

/// Position decoded from a GGA sentence, in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GgaFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Fix quality indicator (1 = GPS, 2 = DGPS, ...).
    pub quality: u8,
    pub satellites: Option<u8>,
}

impl GgaFix {
    /// `lat,lon` with four decimal places, the form written to the location file.
    pub fn to_location_string(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Parses a single GGA sentence.
pub fn parse_gga(line: &str) -> Result<GgaFix, NmeaError> {
    let cleaned: String = line.chars().filter(|c| *c != '\0').collect();
    let sentence = cleaned.trim();
    let body = sentence.strip_prefix('$').ok_or(NmeaError::NotGga)?;

    let body = match body.split_once('*') {
        Some((data, checksum)) => {
            let expected = u8::from_str_radix(checksum.trim(), 16)
                .map_err(|_| NmeaError::Malformed("checksum"))?;
            let computed = data.bytes().fold(0u8, |acc, b| acc ^ b);
            if expected != computed {
                return Err(NmeaError::Checksum { expected, computed });
            }
            data
        }
        None => body,
    };

    let fields: Vec<&str> = body.split(',').collect();
    match fields.first() {
        Some(&"GPGGA") | Some(&"GNGGA") => {}
        _ => return Err(NmeaError::NotGga),
    }
    if fields.len() < 8 {
        return Err(NmeaError::Truncated);
    }

    let quality = fields[6]
        .parse::<u8>()
        .map_err(|_| NmeaError::Malformed("quality"))?;
    if quality == 0 {
        return Err(NmeaError::NoFix);
    }

    let latitude = coordinate(fields[2], fields[3], 2, ('N', 'S'), "latitude")?;
    let longitude = coordinate(fields[4], fields[5], 3, ('E', 'W'), "longitude")?;
    let satellites = fields[7].parse::<u8>().ok();

    Ok(GgaFix {
        latitude,
        longitude,
        quality,
        satellites,
    })
}

/// Returns the first valid GGA fix in a capture, skipping other sentences
/// and GGA lines without a fix.
pub fn first_fix(capture: &str) -> Result<GgaFix, NmeaError> {
    capture
        .lines()
        .filter(|line| line.contains("GGA"))
        .find_map(|line| parse_gga(line).ok())
        .ok_or(NmeaError::NotFound)
}

/// Converts `ddmm.mmmm` (or `dddmm.mmmm`) plus hemisphere into decimal degrees.
fn coordinate(
    value: &str,
    hemisphere: &str,
    degree_digits: usize,
    (positive, negative): (char, char),
    field: &'static str,
) -> Result<f64, NmeaError> {
    if value.len() <= degree_digits || !value.is_char_boundary(degree_digits) {
        return Err(NmeaError::Malformed(field));
    }
    let (degrees, minutes) = value.split_at(degree_digits);
    let degrees: f64 = degrees.parse().map_err(|_| NmeaError::Malformed(field))?;
    let minutes: f64 = minutes.parse().map_err(|_| NmeaError::Malformed(field))?;
    if !(0.0..60.0).contains(&minutes) {
        return Err(NmeaError::Malformed(field));
    }

    let magnitude = degrees + minutes / 60.0;
    let mut hemisphere = hemisphere.chars();
    match (hemisphere.next(), hemisphere.next()) {
        (Some(c), None) if c == positive => Ok(magnitude),
        (Some(c), None) if c == negative => Ok(-magnitude),
        _ => Err(NmeaError::Malformed(field)),
    }
}
