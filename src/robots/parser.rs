//! robots.txt rule parsing
//!
//! Only two directives matter here: every `Disallow` path (regardless of the
//! user-agent group it appears in) and the `Crawl-delay` of the `*` group.

/// Parsed robots.txt rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsRules {
    /// Non-empty `Disallow` path prefixes
    disallowed: Vec<String>,
    /// `Crawl-delay` for the wildcard group, in seconds
    crawl_delay: Option<f64>,
}

impl RobotsRules {
    /// Parses raw robots.txt content
    ///
    /// Comments (`#` to end of line) and blank lines are ignored. Directive
    /// names are case-insensitive.
    pub fn from_content(content: &str) -> Self {
        let mut disallowed = Vec::new();
        let mut crawl_delay = None;

        let mut group_agents: Vec<String> = Vec::new();
        let mut group_has_rules = false;

        for line in content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    // A user-agent line after rules starts a new group
                    if group_has_rules {
                        group_agents.clear();
                        group_has_rules = false;
                    }
                    group_agents.push(value.to_ascii_lowercase());
                }
                "disallow" => {
                    group_has_rules = true;
                    if !value.is_empty() && !disallowed.iter().any(|p| p == value) {
                        disallowed.push(value.to_string());
                    }
                }
                "crawl-delay" => {
                    group_has_rules = true;
                    if crawl_delay.is_none() && group_agents.iter().any(|a| a == "*") {
                        crawl_delay = value
                            .parse::<f64>()
                            .ok()
                            .filter(|d| d.is_finite() && *d >= 0.0);
                    }
                }
                _ => {
                    group_has_rules = true;
                }
            }
        }

        Self {
            disallowed,
            crawl_delay,
        }
    }

    /// Rules that allow every path
    ///
    /// Used when robots.txt is absent or could not be retrieved.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns false when any disallowed path is a prefix of `path`
    pub fn is_allowed(&self, path: &str) -> bool {
        !self
            .disallowed
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Crawl delay in seconds for the wildcard group
    pub fn crawl_delay(&self) -> Option<f64> {
        self.crawl_delay
    }

    /// The disallowed path prefixes, in file order
    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }
}
