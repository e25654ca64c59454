//! Robots.txt parser implementation
//!
//! Only `Disallow` directives are honoured. They apply regardless of the
//! `User-agent` group they appear in, and a path is disallowed when it starts
//! with any recorded prefix.

/// Parsed robots.txt data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRobots {
    /// Raw robots.txt content (empty string means allow all)
    content: String,

    /// Disallowed path prefixes in file order
    disallowed: Vec<String>,
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    ///
    /// Directive names are matched case-insensitively. `#` comments are
    /// stripped and `Disallow:` lines with an empty value are ignored, since
    /// an empty value allows everything.
    ///
    /// # Example
    ///
    /// ```
    /// use shelf_harvest::robots::ParsedRobots;
    ///
    /// let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /search/\n");
    /// assert!(!robots.is_allowed("/search/case/opt/page:1/"));
    /// assert!(robots.is_allowed("/product/123"));
    /// ```
    pub fn from_content(content: &str) -> Self {
        let disallowed = content
            .lines()
            .map(|line| line.split('#').next().unwrap_or_default().trim())
            .filter_map(|line| {
                let (directive, value) = line.split_once(':')?;
                if !directive.trim().eq_ignore_ascii_case("disallow") {
                    return None;
                }
                let value = value.trim();
                (!value.is_empty()).then(|| value.to_string())
            })
            .collect();

        Self {
            content: content.to_string(),
            disallowed,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used as the default when robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns the raw robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn disallowed_prefixes(&self) -> &[String] {
        &self.disallowed
    }

    /// Returns the first disallowed prefix that `path` falls under
    pub fn disallowing_prefix(&self, path: &str) -> Option<&str> {
        self.disallowed
            .iter()
            .find(|prefix| path.starts_with(prefix.as_str()))
            .map(String::as_str)
    }

    /// Checks if a request path is allowed
    pub fn is_allowed(&self, path: &str) -> bool {
        self.disallowing_prefix(path).is_none()
    }
}
