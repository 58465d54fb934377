//! Platform-conditional inclusion rules.
//!
//! Pure evaluation, no side effects. Rules are processed in declaration
//! order and the last matching rule wins; a rule set that matches nothing
//! excludes the entry. This is the single policy for the whole crate —
//! call sites never re-implement rule logic.

use serde::Deserialize;

/// Execution platforms as named on the wire by version descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Osx,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Osx
        } else {
            Platform::Linux
        }
    }

    /// Name used in descriptor `os.name` constraints and `natives` maps.
    pub fn wire_name(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Osx => "osx",
            Platform::Linux => "linux",
        }
    }

    /// Separator for the dependency search path handed to the runtime.
    pub fn classpath_separator(self) -> &'static str {
        match self {
            Platform::Windows => ";",
            _ => ":",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

/// A single conditional-inclusion rule. An absent constraint matches every
/// platform.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsConstraint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsConstraint {
    #[serde(default)]
    pub name: Option<String>,
}

impl Rule {
    fn matches(&self, platform: Platform) -> bool {
        match &self.os {
            None => true,
            Some(os) => match &os.name {
                None => true,
                Some(name) => name == platform.wire_name(),
            },
        }
    }
}

/// Decide whether an entry guarded by `rules` applies on `platform`.
///
/// An empty rule set always applies. Otherwise every matching rule
/// overrides the running decision with its action; entries whose rules
/// never match are excluded.
pub fn evaluate(rules: &[Rule], platform: Platform) -> bool {
    if rules.is_empty() {
        return true;
    }

    let mut allowed = false;
    for rule in rules {
        if rule.matches(platform) {
            allowed = rule.action == RuleAction::Allow;
        }
    }
    allowed
}
