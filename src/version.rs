// Version and build information

/// Build information structure
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: String,
    pub build_date: String,
    pub build_hash: String,
    pub target_triple: String,
    pub git_clean: String,
    pub optimized: bool,
}

/// Crate version baked in at compile time
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get current build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: version().to_string(),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown").to_string(),
        build_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        target_triple: option_env!("BUILD_TARGET").unwrap_or("unknown").to_string(),
        git_clean: option_env!("GIT_CLEAN").unwrap_or("unknown").to_string(),
        optimized: cfg!(not(debug_assertions)),
    }
}

impl BuildInfo {
    pub fn format_display(&self) -> String {
        format!("kmodctl v{}", self.version)
    }

    pub fn format_detailed(&self) -> String {
        let mut result = self.format_display();

        if !self.build_hash.is_empty() && self.build_hash != "unknown" {
            result.push_str(&format!(" (commit {})", self.build_hash));
        }
        if self.git_clean == "false" {
            result.push_str(" [dirty]");
        }

        result
    }

    pub fn format_build_info(&self) -> String {
        format!(
            "Build: {}\nTarget: {}\nProfile: {}\nGit: {}\nClean: {}",
            self.build_date,
            self.target_triple,
            if self.optimized { "release" } else { "debug" },
            self.build_hash,
            self.git_clean
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BuildInfo {
        BuildInfo {
            version: "0.1.0".to_string(),
            build_date: "2026-10-18T00:00:00Z".to_string(),
            build_hash: "abc1234".to_string(),
            target_triple: "x86_64-unknown-linux-gnu".to_string(),
            git_clean: "false".to_string(),
            optimized: true,
        }
    }

    #[test]
    fn test_version_matches_package() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(build_info().format_display(), format!("kmodctl v{}", version()));
    }

    #[test]
    fn test_format_detailed() {
        assert_eq!(sample().format_detailed(), "kmodctl v0.1.0 (commit abc1234) [dirty]");

        let unknown = BuildInfo {
            build_hash: "unknown".to_string(),
            git_clean: "unknown".to_string(),
            ..sample()
        };
        assert_eq!(unknown.format_detailed(), "kmodctl v0.1.0");
    }

    #[test]
    fn test_format_build_info() {
        let text = sample().format_build_info();
        assert!(text.contains("Target: x86_64-unknown-linux-gnu"));
        assert!(text.contains("Profile: release"));
        assert!(text.contains("Git: abc1234"));
    }
}
