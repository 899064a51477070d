//! GPS capture → location file.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{info, instrument};

use klaxon_core::nmea::{first_fix, GgaFix};

/// Extracts the first GGA fix from an NMEA capture and writes it as
/// `lat,lon` to `output`.
#[instrument(level = "info", name = "locate", skip_all, fields(nmea = %nmea.display()))]
pub fn locate(nmea: &Path, output: &Path) -> anyhow::Result<GgaFix> {
    let raw = fs::read(nmea).with_context(|| format!("failed to read {}", nmea.display()))?;
    let capture = String::from_utf8_lossy(&raw);
    let fix = first_fix(&capture).with_context(|| format!("no usable fix in {}", nmea.display()))?;

    let location = fix.to_location_string();
    fs::write(output, &location)
        .with_context(|| format!("failed to write location to {}", output.display()))?;
    info!(%location, output = %output.display(), quality = fix.quality, "location file updated");
    Ok(fix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use klaxon_core::location::read_location;

    #[test]
    fn writes_first_fix_as_location() {
        let dir = tempfile::tempdir().unwrap();
        let nmea = dir.path().join("_output2");
        let output = dir.path().join("log.txt");
        let mut capture = b"\0\0$GPRMC,172814.0,A,3408.262,N,11807.494,W,0.0,0.0,010117,,\r\n".to_vec();
        capture.extend_from_slice(b"$GPGGA,172814.0,3408.262,N,11807.494,W,1,08,0.9,263.0,M,-32.8,M,,\r\n");
        fs::write(&nmea, capture).unwrap();

        let fix = locate(&nmea, &output).unwrap();
        assert_eq!(fix.quality, 1);

        let location = read_location(&output, true).unwrap();
        assert_eq!(location.as_str(), "34.1377,-118.1249");
    }

    #[test]
    fn capture_without_fix_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let nmea = dir.path().join("_output2");
        let output = dir.path().join("log.txt");
        fs::write(&nmea, "$GPGGA,000000,,,,,0,00,,,M,,M,,\n").unwrap();
        fs::write(&output, "previous").unwrap();

        let err = locate(&nmea, &output).unwrap_err();
        assert!(err.to_string().contains("no usable fix"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
    }
}
