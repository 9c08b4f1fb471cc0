// src/tools/check.rs

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::exec::{BinaryResolver, Executor, InvocationRequest};

use super::{install_hint, version_pattern};

/// Flags tried in turn to get a version string out of a tool.
const VERSION_FLAGS: &[&str] = &["-version", "--version", "-v", "version"];

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub binary: Option<PathBuf>,
    pub available: bool,
    pub version: Option<String>,
    pub install_hint: Option<String>,
}

/// Locate `name` and try to read its version.
///
/// Version probes run through `executor`, so they are subject to the same
/// concurrency limit and timeouts as any other invocation. A tool that is
/// present but prints no recognisable version is still available.
pub async fn check_tool<E: Executor + ?Sized>(executor: &E, name: &str) -> ToolInfo {
    let hint = install_hint(name).map(str::to_string);
    let Some(binary) = executor.resolve_tool(name) else {
        debug!(tool = name, "not installed");
        return ToolInfo {
            name: name.to_string(),
            binary: None,
            available: false,
            version: None,
            install_hint: hint,
        };
    };

    let program = binary.to_string_lossy().into_owned();
    let mut version = None;
    for &flag in VERSION_FLAGS {
        let request = match InvocationRequest::new([program.as_str(), flag])
            .and_then(|r| r.with_timeout(VERSION_PROBE_TIMEOUT))
        {
            Ok(r) => r.with_description(format!("{name} {flag}")),
            Err(e) => {
                warn!(tool = name, error = %e, "cannot build version probe");
                break;
            }
        };
        let result = executor.dispatch(request).await;
        if result.timed_out {
            continue;
        }
        if let Some(v) = extract_version(name, &result.output()) {
            version = Some(v);
            break;
        }
    }

    debug!(tool = name, ?version, "tool available");
    ToolInfo {
        name: name.to_string(),
        binary: Some(binary),
        available: true,
        version,
        install_hint: hint,
    }
}

/// Check every tool in `names`, in order.
pub async fn check_tools<E, S>(executor: &E, names: &[S]) -> Vec<ToolInfo>
where
    E: Executor + ?Sized,
    S: AsRef<str>,
{
    let mut infos = Vec::with_capacity(names.len());
    for name in names {
        infos.push(check_tool(executor, name.as_ref()).await);
    }
    infos
}

/// The subset of `names` that `resolver` cannot find.
pub fn missing_tools<S: AsRef<str>>(resolver: &BinaryResolver, names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !resolver.is_available(name))
        .map(str::to_string)
        .collect()
}

/// First version string in `output`, using the tool's known pattern.
pub fn extract_version(name: &str, output: &str) -> Option<String> {
    let re = match Regex::new(version_pattern(name)) {
        Ok(re) => re,
        Err(e) => {
            warn!(tool = name, error = %e, "bad version pattern");
            return None;
        }
    };
    re.captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_versions_with_tool_patterns() {
        assert_eq!(
            extract_version("nuclei", "Nuclei Engine Version: v3.1.4").as_deref(),
            Some("3.1.4")
        );
        assert_eq!(
            extract_version("nmap", "Nmap version 7.94 ( https://nmap.org )").as_deref(),
            Some("7.94")
        );
        assert_eq!(
            extract_version("go", "go version go1.22.3 linux/amd64").as_deref(),
            Some("1.22.3")
        );
        assert_eq!(extract_version("whatever", "tool v2.0").as_deref(), Some("2.0"));
        assert_eq!(extract_version("whatever", "no digits here"), None);
    }

    #[test]
    fn missing_tools_lists_unresolvable_names() {
        let resolver = BinaryResolver::new(Vec::<PathBuf>::new());
        let missing = missing_tools(&resolver, &["definitely-not-installed-abc"]);
        assert_eq!(missing, vec!["definitely-not-installed-abc".to_string()]);
    }
}
