use std::fmt;

/// Operator supplied host name the site is served under, kept exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain(String);

impl Domain {
    pub fn parse(input: &str) -> Result<Domain, anyhow::Error> {
        let name = input.trim();
        if name.is_empty() {
            anyhow::bail!("domain must not be empty");
        }
        if name.len() > 253 {
            anyhow::bail!("domain is longer than 253 characters: {}", name);
        }
        for label in name.split('.') {
            if label.is_empty() || label.len() > 63 {
                anyhow::bail!("invalid domain label in {}", input);
            }
            if label.starts_with('-') || label.ends_with('-') {
                anyhow::bail!("domain labels cannot start or end with '-': {}", input);
            }
            if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                anyhow::bail!("domain contains invalid characters: {}", input);
            }
        }
        Ok(Domain(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Domain;

    #[test]
    fn accepts_hostnames_verbatim() {
        assert_eq!(Domain::parse("LMS.Example.org").unwrap().as_str(), "LMS.Example.org");
        assert_eq!(Domain::parse("  moodle.example.org\n").unwrap().as_str(), "moodle.example.org");
        assert_eq!(Domain::parse("localhost").unwrap().as_str(), "localhost");
    }

    #[test]
    fn rejects_empty_and_malformed_names() {
        for bad in ["", "  ", "a..b", "-lead.example.org", "trail-.example.org", "sp ace.org", "x;rm -rf.org", "moodle.example.org."] {
            assert!(Domain::parse(bad).is_err(), "{} should be rejected", bad);
        }
        assert!(Domain::parse(&"a".repeat(64)).is_err());
    }
}
