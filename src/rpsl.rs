//! General RPSL object grammar.
//!
//! An object is a list of `attribute: value` lines. A line starting with
//! whitespace or `+` continues the previous attribute. Attribute names are
//! case-insensitive and repeated names accumulate in order. `#` starts an
//! end-of-line comment inside values.

use crate::error::RpslError;

/// Attributes whose values are comma-separated lists.
const LIST_ATTRIBUTES: &[&str] = &["members", "mp-members", "mnt-by"];

/// A parsed RPSL object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpslObject {
    attributes: Vec<(String, String)>,
}

impl RpslObject {
    /// Parse object text.
    pub fn parse(text: &str) -> Result<Self, RpslError> {
        let mut attributes: Vec<(String, String)> = Vec::new();

        for line in text.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = continuation(line) {
                let (_, value) = attributes
                    .last_mut()
                    .ok_or_else(|| RpslError::OrphanContinuation(line.to_string()))?;
                value.push(' ');
                value.push_str(strip_comment(rest));
                continue;
            }

            let (name, value) = line
                .split_once(':')
                .filter(|(name, _)| is_attribute_name(name))
                .ok_or_else(|| RpslError::MalformedLine(line.to_string()))?;
            attributes.push((name.to_ascii_lowercase(), strip_comment(value).to_string()));
        }

        for (_, value) in attributes.iter_mut() {
            *value = collapse_whitespace(value);
        }

        let (class, key) = attributes.first().ok_or(RpslError::Empty)?;
        if key.is_empty() {
            return Err(RpslError::EmptyPrimaryKey(class.clone()));
        }

        Ok(Self { attributes })
    }

    /// Object class, the name of the first attribute.
    pub fn class(&self) -> &str {
        &self.attributes[0].0
    }

    /// Primary key, the value of the first attribute.
    pub fn primary_key(&self) -> &str {
        &self.attributes[0].1
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    /// All values of an attribute, in object order.
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let name = name.to_string();
        self.attributes
            .iter()
            .filter(move |(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value of an attribute.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }

    /// Values of an attribute, with list attributes split on commas.
    pub fn list(&self, name: &str) -> Vec<&str> {
        if LIST_ATTRIBUTES.contains(&name) {
            self.values(name)
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .collect()
        } else {
            self.values(name).filter(|v| !v.is_empty()).collect()
        }
    }

    /// Values of an attribute joined with single spaces, `None` if absent.
    pub fn joined(&self, name: &str) -> Option<String> {
        if !self.contains(name) {
            return None;
        }
        Some(self.list(name).join(" "))
    }
}

fn continuation(line: &str) -> Option<&str> {
    if line.starts_with(' ') || line.starts_with('\t') {
        Some(line)
    } else {
        line.strip_prefix('+')
    }
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn strip_comment(value: &str) -> &str {
    match value.find('#') {
        Some(idx) => &value[..idx],
        None => value,
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inetnum() {
        let obj = RpslObject::parse(
            "inetnum:   192.0.2.0 - 192.0.2.255\n\
             netname:   EXAMPLE-NET\n\
             descr:     Example  network\n\
             descr:     Second line\n\
             country:   NL\n\
             mnt-by:    MNT-A, MNT-B\n\
             mnt-by:    MNT-C\n\
             source:    RIPE # Filtered\n",
        )
        .unwrap();

        assert_eq!(obj.class(), "inetnum");
        assert_eq!(obj.primary_key(), "192.0.2.0 - 192.0.2.255");
        assert_eq!(obj.first("netname"), Some("EXAMPLE-NET"));
        assert_eq!(obj.joined("descr").as_deref(), Some("Example network Second line"));
        assert_eq!(obj.list("mnt-by"), vec!["MNT-A", "MNT-B", "MNT-C"]);
        assert_eq!(obj.first("source"), Some("RIPE"));
        assert_eq!(obj.joined("created"), None);
    }

    #[test]
    fn test_continuation_lines() {
        let obj = RpslObject::parse(
            "route-set: RS-EXAMPLE\n\
             members:   10.0.0.0/24,\n\
             \x20          10.0.1.0/24,\n\
             +          10.0.2.0/24\n\
             descr:     set\n",
        )
        .unwrap();
        assert_eq!(
            obj.list("members"),
            vec!["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24"]
        );
        assert_eq!(obj.joined("descr").as_deref(), Some("set"));
    }

    #[test]
    fn test_values_outlive_attribute_name() {
        let obj = RpslObject::parse("route-set: RS-X\nmembers: 10.0.0.0/8, 11.0.0.0/8\ndescr: one\n")
            .unwrap();
        let (descr, members) = {
            let descr_key = String::from("descr");
            let members_key = String::from("members");
            (obj.first(&descr_key), obj.list(&members_key))
        };
        assert_eq!(descr, Some("one"));
        assert_eq!(members, vec!["10.0.0.0/8", "11.0.0.0/8"]);

        let values: Vec<&str> = obj.values(&String::from("descr")).collect();
        assert_eq!(values, vec!["one"]);
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let obj = RpslObject::parse("route: 10.0.0.0/8\nDescr: Mixed\n").unwrap();
        assert_eq!(obj.first("descr"), Some("Mixed"));
    }

    #[test]
    fn test_value_keeps_colons() {
        let obj = RpslObject::parse("route6: 2001:db8::/32\nchanged: a@b.c 20200101\n").unwrap();
        assert_eq!(obj.primary_key(), "2001:db8::/32");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(RpslObject::parse(""), Err(RpslError::Empty));
        assert!(matches!(
            RpslObject::parse("  leading: continuation\n"),
            Err(RpslError::OrphanContinuation(_))
        ));
        assert!(matches!(
            RpslObject::parse("route: 10.0.0.0/8\nthis line has no colon\n"),
            Err(RpslError::MalformedLine(_))
        ));
        assert!(matches!(
            RpslObject::parse("route:\norigin: AS1\n"),
            Err(RpslError::EmptyPrimaryKey(_))
        ));
    }
}
