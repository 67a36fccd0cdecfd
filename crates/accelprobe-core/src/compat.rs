//! Driver versus runtime CUDA version cross-check.

use tracing::debug;

use crate::domain::DriverCompatibility;

/// Parse a version string into a `(major, minor)` tuple.
///
/// Accepts `"12.4"`, `"12.4.131"` and `"V12.4.131"`.
pub fn parse_version_tuple(version: &str) -> Option<(u32, u32)> {
    let version = version.trim().trim_start_matches(['v', 'V']);
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Compare the CUDA version the runtime was built against with the highest
/// version the installed driver supports.
///
/// A driver supports every CUDA release up to the one it reports, so the
/// pair is compatible when `driver >= runtime` on `(major, minor)`.
pub fn assess_driver_compatibility(
    runtime_cuda: Option<&str>,
    driver_cuda: Option<&str>,
) -> DriverCompatibility {
    let (Some(runtime), Some(driver)) = (runtime_cuda, driver_cuda) else {
        return DriverCompatibility::Unknown;
    };
    let (Some(runtime_tuple), Some(driver_tuple)) =
        (parse_version_tuple(runtime), parse_version_tuple(driver))
    else {
        debug!(runtime, driver, "Unparseable CUDA version, compatibility unknown");
        return DriverCompatibility::Unknown;
    };

    if driver_tuple >= runtime_tuple {
        DriverCompatibility::Compatible
    } else {
        DriverCompatibility::DriverTooOld {
            driver: driver.to_string(),
            runtime: runtime.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_tuple_valid() {
        assert_eq!(parse_version_tuple("11.8.89"), Some((11, 8)));
        assert_eq!(parse_version_tuple("12.0"), Some((12, 0)));
        assert_eq!(parse_version_tuple("V12.4.131"), Some((12, 4)));
    }

    #[test]
    fn test_parse_version_tuple_invalid() {
        assert_eq!(parse_version_tuple("invalid"), None);
        assert_eq!(parse_version_tuple("1"), None);
        assert_eq!(parse_version_tuple("unknown"), None);
    }

    #[test]
    fn test_newer_driver_is_compatible() {
        assert_eq!(
            assess_driver_compatibility(Some("12.1"), Some("12.4")),
            DriverCompatibility::Compatible
        );
        assert_eq!(
            assess_driver_compatibility(Some("11.8"), Some("12.0")),
            DriverCompatibility::Compatible
        );
        assert_eq!(
            assess_driver_compatibility(Some("12.4"), Some("12.4")),
            DriverCompatibility::Compatible
        );
    }

    #[test]
    fn test_older_driver_is_flagged() {
        assert_eq!(
            assess_driver_compatibility(Some("12.4"), Some("11.8")),
            DriverCompatibility::DriverTooOld {
                driver: "11.8".to_string(),
                runtime: "12.4".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_side_is_unknown() {
        assert_eq!(
            assess_driver_compatibility(None, Some("12.4")),
            DriverCompatibility::Unknown
        );
        assert_eq!(
            assess_driver_compatibility(Some("unknown"), Some("12.4")),
            DriverCompatibility::Unknown
        );
    }
}
