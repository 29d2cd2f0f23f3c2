//! Ordered substring replacement.
//!
//! Each `(from, to)` pair is applied to the whole text in table order, so
//! later entries see the output of earlier ones. `"pimples"` must therefore
//! precede `"pimple"` in a table that maps both.

use super::CharFilter;

#[derive(Clone, Debug)]
pub struct MappingCharFilter {
    mapping: Vec<(String, String)>,
}

impl MappingCharFilter {
    /// Create a mapping filter; empty sources are skipped.
    pub fn new<I, F, T>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (F, T)>,
        F: Into<String>,
        T: Into<String>,
    {
        let mapping = mapping
            .into_iter()
            .map(|(from, to)| (from.into(), to.into()))
            .filter(|(from, _)| !from.is_empty())
            .collect();
        Self { mapping }
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

impl CharFilter for MappingCharFilter {
    fn filter(&self, input: &str) -> String {
        let mut output = input.to_string();
        for (from, to) in &self.mapping {
            if output.contains(from.as_str()) {
                output = output.replace(from.as_str(), to);
            }
        }
        output
    }

    fn name(&self) -> &'static str {
        "mapping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_char_filter() {
        let filter = MappingCharFilter::new(vec![("ph", "f"), ("qu", "k")]);
        assert_eq!(filter.filter("phone queue"), "fone keue");
    }

    #[test]
    fn test_mapping_is_ordered() {
        let filter = MappingCharFilter::new(vec![
            ("pimples", "breakout"),
            ("pimple", "breakout"),
            ("break out", "breakout"),
        ]);
        assert_eq!(filter.filter("pimples and a pimple"), "breakout and a breakout");
        assert_eq!(filter.filter("i break out"), "i breakout");
    }

    #[test]
    fn test_negation_needs_surrounding_spaces() {
        let filter = MappingCharFilter::new(vec![(" no ", " not ")]);
        assert_eq!(filter.filter("there is no way"), "there is not way");
        assert_eq!(filter.filter("nothing known"), "nothing known");
    }
}
