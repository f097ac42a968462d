//! Catalog of fragment styles understood by the slideshow runtime.
//!
//! The segmenter treats animation names as opaque strings; this list only
//! backs front-end pickers and warnings about likely typos.

/// Name that disables fragment animation.
pub const NO_ANIMATION: &str = "none";

/// Known fragment styles, in picker order.
pub const KNOWN_ANIMATIONS: &[&str] = &[
    NO_ANIMATION,
    "fade-out",
    "fade-up",
    "fade-down",
    "fade-left",
    "fade-right",
    "fade-in-then-out",
    "current-visible",
    "fade-in-then-semi-out",
    "grow",
    "semi-fade-out",
    "shrink",
    "strike",
    "highlight-red",
    "highlight-green",
    "highlight-blue",
    "highlight-current-red",
    "highlight-current-green",
    "highlight-current-blue",
];

/// Whether `name` is in the catalog.
pub fn is_known(name: &str) -> bool {
    KNOWN_ANIMATIONS.contains(&name)
}

/// Normalize a caller-supplied name: blank and `none` mean no animation.
pub fn resolve(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|n| !n.is_empty() && *n != NO_ANIMATION)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_known() {
        assert!(is_known("fade-up"));
        assert!(is_known("none"));
        assert!(!is_known("fade-sideways"));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(None), None);
        assert_eq!(resolve(Some("none")), None);
        assert_eq!(resolve(Some("  ")), None);
        assert_eq!(resolve(Some(" grow ")).as_deref(), Some("grow"));
        assert_eq!(resolve(Some("custom-style")).as_deref(), Some("custom-style"));
    }
}
