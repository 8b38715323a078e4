//! Structural parsing of SNS endpoint ARNs.
//!
//! A platform endpoint ARN looks like
//! `arn:aws:sns:us-east-1:123456789012:endpoint/GCM/MyApp/5c8e...`. The
//! platform slug is the segment after the first `/`, and everything before
//! the last `/` identifies the owning application.

/// Extract the platform slug (`GCM`, `APNS`, ...) from an ARN.
///
/// Returns `None` unless the ARN has at least two `/` separators. The slug is
/// not checked against known platforms.
///
/// ```
/// use armature_sns::arn::platform_segment;
///
/// assert_eq!(platform_segment("app/GCM/device"), Some("GCM"));
/// assert_eq!(platform_segment("no-slashes"), None);
/// ```
pub fn platform_segment(arn: &str) -> Option<&str> {
    let start = arn.find('/').map_or(0, |i| i + 1);
    let len = arn[start..].find('/')?;
    Some(&arn[start..start + len])
}

/// Everything before the last `/` of an endpoint ARN.
pub fn owning_application(endpoint_arn: &str) -> Option<&str> {
    endpoint_arn.rfind('/').map(|i| &endpoint_arn[..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str =
        "arn:aws:sns:us-east-1:123456789012:endpoint/APNS_SANDBOX/MyApp/0a1b2c3d-4e5f";

    #[test]
    fn test_platform_segment() {
        assert_eq!(platform_segment(ENDPOINT), Some("APNS_SANDBOX"));
        assert_eq!(platform_segment("app/PLATFORM/suffix"), Some("PLATFORM"));
        assert_eq!(platform_segment("app/CUSTOM/a/b/c"), Some("CUSTOM"));
    }

    #[test]
    fn test_platform_segment_needs_two_separators() {
        assert_eq!(platform_segment(""), None);
        assert_eq!(platform_segment("app"), None);
        assert_eq!(platform_segment("app/GCM"), None);
    }

    #[test]
    fn test_platform_segment_empty_segment() {
        assert_eq!(platform_segment("app//suffix"), Some(""));
    }

    #[test]
    fn test_owning_application() {
        assert_eq!(
            owning_application(ENDPOINT),
            Some("arn:aws:sns:us-east-1:123456789012:endpoint/APNS_SANDBOX/MyApp")
        );
        assert_eq!(owning_application("app/GCM/x"), Some("app/GCM"));
        assert_eq!(owning_application("no-slashes"), None);
    }
}
