//! Platform filtering for categories

/// Platform names accepted in a category's `platforms` list
pub const KNOWN_PLATFORMS: [&str; 3] = ["macos", "linux", "windows"];

/// Identifier of the platform this binary was built for
#[must_use]
pub const fn current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

/// Whether the current platform is in `platforms` (`None` or empty matches all)
#[must_use]
pub fn is_platform_match(platforms: Option<&[String]>) -> bool {
    match platforms {
        None => true,
        Some([]) => true,
        Some(list) => list.iter().any(|p| p == current_platform()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform_is_known() {
        assert!(KNOWN_PLATFORMS.contains(&current_platform()));
    }

    #[test]
    fn test_platform_match() {
        assert!(is_platform_match(None));
        assert!(is_platform_match(Some(&[])));
        assert!(is_platform_match(Some(&[current_platform().to_string()])));

        let others: Vec<String> = KNOWN_PLATFORMS
            .iter()
            .filter(|p| **p != current_platform())
            .map(|p| (*p).to_string())
            .collect();
        assert!(!is_platform_match(Some(&others)));
    }
}
