//! Id and name generation for new shapes.
//!
//! Ids are unique within one shape tree. Generated names carry a number one
//! above the largest number found in the existing names, so they never
//! collide with a name already present.
use crate::common::xml::XmlElement;
use crate::common::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::{Duration, Instant};

static DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("Failed to build digit pattern"));

/// Tree children that are properties of the tree rather than shapes.
const TREE_PROPERTIES: &[&str] = &["nvGrpSpPr", "grpSpPr", "extLst"];

/// Shape elements directly under `tree`.
pub(crate) fn shape_elements(tree: &XmlElement) -> Vec<XmlElement> {
    tree.children()
        .into_iter()
        .filter(|c| !TREE_PROPERTIES.contains(&c.local_name().as_str()))
        .collect()
}

fn c_nv_pr(shape: &XmlElement) -> Option<XmlElement> {
    shape.first_child()?.child("cNvPr")
}

/// Ids of the shapes directly under `tree`.
pub(crate) fn ids(tree: &XmlElement) -> Vec<u32> {
    shape_elements(tree)
        .iter()
        .filter_map(c_nv_pr)
        .filter_map(|c| c.attr("id"))
        .filter_map(|id| atoi_simd::parse::<u32, false, false>(id.as_bytes()).ok())
        .collect()
}

/// Names of the shapes directly under `tree`.
pub(crate) fn names(tree: &XmlElement) -> Vec<String> {
    shape_elements(tree)
        .iter()
        .filter_map(c_nv_pr)
        .filter_map(|c| c.attr("name"))
        .collect()
}

/// One above the largest id in `tree`, or 1 when it has no shapes.
pub(crate) fn next_id(tree: &XmlElement) -> u32 {
    ids(tree).into_iter().max().map_or(1, |max| max.saturating_add(1))
}

/// Scans names under a time budget.
pub(crate) struct NameMatcher {
    budget: Duration,
    started: Instant,
}

impl NameMatcher {
    pub(crate) fn new(budget: Duration) -> Self {
        Self {
            budget,
            started: Instant::now(),
        }
    }

    fn check(&self) -> Result<()> {
        if self.started.elapsed() > self.budget {
            return Err(Error::MatchTimeout(self.budget));
        }
        Ok(())
    }

    /// Numbers of every digit run in `name`.
    fn numbers(&self, name: &str) -> Result<Vec<u64>> {
        self.check()?;
        Ok(DIGITS
            .find_iter(name)
            .filter_map(|m| m.as_str().parse().ok())
            .collect())
    }

    /// `"{prefix} N"` with N above every number in every name.
    pub(crate) fn next_auto_name(&self, names: &[String], prefix: &str) -> Result<String> {
        let mut max: u64 = 0;
        for name in names {
            if let Some(n) = self.numbers(name)?.into_iter().max() {
                max = max.max(n);
            }
        }
        Ok(format!("{} {}", prefix, max.saturating_add(1)))
    }

    /// `"Table N"` with N above the first number of every name.
    pub(crate) fn next_table_name(&self, names: &[String]) -> Result<String> {
        let mut max: u64 = 0;
        for name in names {
            if let Some(&n) = self.numbers(name)?.first() {
                max = max.max(n);
            }
        }
        Ok(format!("Table {}", max.saturating_add(1)))
    }

    /// `name` itself when free, otherwise its stem numbered past every
    /// existing name with the same stem.
    ///
    /// A name without a trailing number counts as number 1.
    pub(crate) fn disambiguate(&self, name: &str, names: &[String]) -> Result<String> {
        if !names.iter().any(|n| n == name) {
            return Ok(name.to_string());
        }

        let stem = name_stem(name);
        let mut max: u64 = 1;
        for existing in names {
            self.check()?;
            if name_stem(existing) != stem {
                continue;
            }
            let suffix = existing[stem.len()..].trim();
            let n = if suffix.is_empty() {
                1
            } else {
                suffix.parse().unwrap_or(1)
            };
            max = max.max(n);
        }

        if stem.is_empty() {
            return Ok(format!("{}", max.saturating_add(1)));
        }
        Ok(format!("{} {}", stem, max.saturating_add(1)))
    }
}

/// `name` without its trailing number and the whitespace before it.
fn name_stem(name: &str) -> &str {
    name.trim_end_matches(|c: char| c.is_ascii_digit())
        .trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::template;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn matcher() -> NameMatcher {
        NameMatcher::new(Duration::from_secs(100))
    }

    #[test]
    fn test_next_id() {
        let tree = XmlElement::parse(template::empty_slide_xml())
            .unwrap()
            .path(&["cSld", "spTree"])
            .unwrap();
        // The tree's own nvGrpSpPr id does not count
        assert_eq!(next_id(&tree), 1);

        for id in [4, 9, 2] {
            let sp = template::autoshape().unwrap();
            sp.path(&["nvSpPr", "cNvPr"]).unwrap().set_attr("id", &id.to_string());
            tree.append(&sp);
        }
        assert_eq!(next_id(&tree), 10);
        assert_eq!(ids(&tree), [4, 9, 2]);
    }

    #[test]
    fn test_next_auto_name() {
        let m = matcher();
        assert_eq!(m.next_auto_name(&[], "AutoShape").unwrap(), "AutoShape 1");
        assert_eq!(
            m.next_auto_name(&names(&["Title 1", "Box 12 copy 3", "Line"]), "AutoShape").unwrap(),
            "AutoShape 13"
        );
    }

    #[test]
    fn test_next_table_name_uses_first_number() {
        let m = matcher();
        assert_eq!(m.next_table_name(&names(&["Table 2", "Chart 3 v40"])).unwrap(), "Table 4");
        assert_eq!(m.next_table_name(&names(&["Picture"])).unwrap(), "Table 1");
    }

    #[test]
    fn test_disambiguate() {
        let m = matcher();
        let existing = names(&["Rectangle", "Rectangle 3", "Oval 2"]);
        assert_eq!(m.disambiguate("Star", &existing).unwrap(), "Star");
        assert_eq!(m.disambiguate("Rectangle", &existing).unwrap(), "Rectangle 4");
        assert_eq!(m.disambiguate("Oval 2", &existing).unwrap(), "Oval 3");
        assert_eq!(m.disambiguate("7", &names(&["7"])).unwrap(), "8");
    }

    #[test]
    fn test_exhausted_budget_times_out() {
        let m = NameMatcher::new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        let err = m.next_auto_name(&names(&["A 1"]), "AutoShape").unwrap_err();
        assert!(matches!(err, Error::MatchTimeout(d) if d == Duration::ZERO));
    }
}
