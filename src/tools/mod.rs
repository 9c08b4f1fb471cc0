// src/tools/mod.rs

//! Catalogue of the recon tools reconrun knows how to help with, and the
//! availability / version checker behind `--check-tools`.

pub mod check;

pub use check::{ToolInfo, check_tool, check_tools, extract_version, missing_tools};

/// Which stage of a recon run a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Discovery,
    Scanning,
    Utility,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 3] = [Self::Discovery, Self::Scanning, Self::Utility];

    pub fn label(self) -> &'static str {
        match self {
            Self::Discovery => "Discovery",
            Self::Scanning => "Scanning",
            Self::Utility => "Utility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownTool {
    pub name: &'static str,
    pub category: Option<ToolCategory>,
    /// First line is the preferred install command.
    pub install_hint: &'static str,
    /// Regex whose first capture group is the version.
    pub version_pattern: Option<&'static str>,
}

/// Version pattern used when a tool has no specific one.
pub const DEFAULT_VERSION_PATTERN: &str = r"v?(\d+\.\d+(?:\.\d+)?)";

const SEMVER: Option<&str> = Some(r"v?(\d+\.\d+\.\d+)");

pub const KNOWN_TOOLS: &[KnownTool] = &[
    KnownTool {
        name: "subfinder",
        category: Some(ToolCategory::Discovery),
        install_hint: "go install github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest",
        version_pattern: SEMVER,
    },
    KnownTool {
        name: "assetfinder",
        category: Some(ToolCategory::Discovery),
        install_hint: "go install github.com/tomnomnom/assetfinder@latest",
        version_pattern: None,
    },
    KnownTool {
        name: "amass",
        category: Some(ToolCategory::Discovery),
        install_hint: "go install github.com/owasp-amass/amass/v4/...@latest",
        version_pattern: None,
    },
    KnownTool {
        name: "httpx",
        category: Some(ToolCategory::Discovery),
        install_hint: "go install github.com/projectdiscovery/httpx/cmd/httpx@latest",
        version_pattern: SEMVER,
    },
    KnownTool {
        name: "nuclei",
        category: Some(ToolCategory::Scanning),
        install_hint: "go install github.com/projectdiscovery/nuclei/v3/cmd/nuclei@latest",
        version_pattern: SEMVER,
    },
    KnownTool {
        name: "ffuf",
        category: Some(ToolCategory::Scanning),
        install_hint: "go install github.com/ffuf/ffuf/v2@latest",
        version_pattern: SEMVER,
    },
    KnownTool {
        name: "naabu",
        category: Some(ToolCategory::Scanning),
        install_hint: "go install github.com/projectdiscovery/naabu/v2/cmd/naabu@latest",
        version_pattern: SEMVER,
    },
    KnownTool {
        name: "rustscan",
        category: Some(ToolCategory::Scanning),
        install_hint: "brew install rustscan  # macOS\ncargo install rustscan  # Linux",
        version_pattern: Some(r"(\d+\.\d+\.\d+)"),
    },
    KnownTool {
        name: "anew",
        category: Some(ToolCategory::Utility),
        install_hint: "go install github.com/tomnomnom/anew@latest",
        version_pattern: None,
    },
    KnownTool {
        name: "waybackurls",
        category: Some(ToolCategory::Utility),
        install_hint: "go install github.com/tomnomnom/waybackurls@latest",
        version_pattern: None,
    },
    KnownTool {
        name: "gau",
        category: Some(ToolCategory::Utility),
        install_hint: "go install github.com/lc/gau/v2/cmd/gau@latest",
        version_pattern: None,
    },
    KnownTool {
        name: "katana",
        category: Some(ToolCategory::Utility),
        install_hint: "go install github.com/projectdiscovery/katana/cmd/katana@latest",
        version_pattern: None,
    },
    KnownTool {
        name: "nmap",
        category: None,
        install_hint: "brew install nmap  # macOS\nsudo apt install nmap  # Linux",
        version_pattern: Some(r"(\d+\.\d+)"),
    },
    KnownTool {
        name: "go",
        category: None,
        install_hint: "https://go.dev/doc/install",
        version_pattern: Some(r"go(\d+\.\d+(?:\.\d+)?)"),
    },
];

pub fn known_tool(name: &str) -> Option<&'static KnownTool> {
    KNOWN_TOOLS.iter().find(|t| t.name == name)
}

pub fn install_hint(name: &str) -> Option<&'static str> {
    known_tool(name).map(|t| t.install_hint)
}

pub fn version_pattern(name: &str) -> &'static str {
    known_tool(name)
        .and_then(|t| t.version_pattern)
        .unwrap_or(DEFAULT_VERSION_PATTERN)
}

/// Names of the tools in `category`, in catalogue order.
pub fn tools_in(category: ToolCategory) -> Vec<&'static str> {
    KNOWN_TOOLS
        .iter()
        .filter(|t| t.category == Some(category))
        .map(|t| t.name)
        .collect()
}

/// Tools with no category (e.g. general-purpose scanners and toolchains).
pub fn uncategorised() -> Vec<&'static str> {
    KNOWN_TOOLS
        .iter()
        .filter(|t| t.category.is_none())
        .map(|t| t.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_match_the_catalogue() {
        assert_eq!(
            tools_in(ToolCategory::Discovery),
            ["subfinder", "assetfinder", "amass", "httpx"]
        );
        let categorised: usize = ToolCategory::ALL.iter().map(|&c| tools_in(c).len()).sum();
        assert_eq!(categorised, 12);
        assert_eq!(uncategorised(), ["nmap", "go"]);
        assert_eq!(categorised + uncategorised().len(), KNOWN_TOOLS.len());
    }

    #[test]
    fn unknown_tools_use_default_pattern() {
        assert_eq!(version_pattern("not-a-tool"), DEFAULT_VERSION_PATTERN);
        assert_eq!(install_hint("not-a-tool"), None);
        assert!(install_hint("nuclei").is_some_and(|h| h.starts_with("go install")));
    }
}
