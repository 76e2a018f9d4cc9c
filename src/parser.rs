use once_cell::sync::Lazy;
use regex::Regex;

use crate::section::{Section, Sections};

// A header is a whole line of the form "[name]". A lone "[" or "]" is not.
static RE_SECTION: Lazy<Regex> = Lazy::new(|| {
    let re = r"^\[(.*)\]$";
    Regex::new(re).expect("could not compile RE_SECTION regexp")
});

/// Builds a [`Sections`] map from logical lines.
pub(crate) struct Parser {
    sections: Sections,
    // Name of the section that key/value lines go into. `None` before the
    // first header, or after an empty "[]" header: such lines are dropped.
    current: Option<String>,
}

impl Parser {
    pub fn new() -> Parser {
        Parser {
            sections: Sections::new(),
            current: None,
        }
    }

    pub fn parse_line(&mut self, line: &str) {
        if let Some(caps) = RE_SECTION.captures(line) {
            let name = &caps[1];
            self.open_section(name);
            return;
        }

        let (key, value) = match line.find('=') {
            Some(n) => (line[..n].trim(), line[n + 1..].trim()),
            None => (line.trim(), ""),
        };

        let section = match self.current {
            Some(ref name) => self.sections.get_mut(name),
            None => None,
        };
        let section = match section {
            Some(section) => section,
            None => {
                debug!("{:?}: not in a section, dropped", key);
                return;
            }
        };
        if let Some(old) = section.insert(key, value) {
            debug!("{:?}: overwriting previous value {:?}", key, old);
        }
    }

    fn open_section(&mut self, name: &str) {
        if name.is_empty() {
            warn!("empty section name \"[]\", ignoring its keys");
            self.current = None;
            return;
        }
        debug!("section [{}]", name);
        if self.sections.insert(name.to_string(), Section::new()).is_some() {
            debug!("section [{}] seen before, discarding earlier keys", name);
        }
        self.current = Some(name.to_string());
    }

    pub fn finish(self) -> Sections {
        self.sections
    }
}

/// Parse a sequence of logical lines into sections.
pub(crate) fn parse_lines<I, S>(lines: I) -> Sections
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = Parser::new();
    for line in lines {
        parser.parse_line(line.as_ref());
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn sections_and_keys() {
        init();
        let sections = parse_lines(&[
            "[server]",
            "host = example.com",
            "port=8080",
            "[client]",
            "retries   =    3",
        ]);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["server"].get("host"), Some("example.com"));
        assert_eq!(sections["server"].get("port"), Some("8080"));
        assert_eq!(sections["client"].get("retries"), Some("3"));
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        init();
        let sections = parse_lines(&["[s]", "key=value=extra", "url = a=b = c"]);
        assert_eq!(sections["s"].get("key"), Some("value=extra"));
        assert_eq!(sections["s"].get("url"), Some("a=b = c"));
    }

    #[test]
    fn keys_before_first_header_are_dropped() {
        init();
        let sections = parse_lines(&["orphan = 1", "[s]", "k = v"]);
        assert_eq!(sections.len(), 1);
        assert!(!sections["s"].contains_key("orphan"));
    }

    #[test]
    fn last_duplicate_key_wins() {
        init();
        let sections = parse_lines(&["[s]", "k = 1", "k = 2"]);
        assert_eq!(sections["s"].get("k"), Some("2"));
    }

    #[test]
    fn repeated_header_discards_earlier_keys() {
        init();
        let sections = parse_lines(&["[s]", "a = 1", "[other]", "[s]", "b = 2"]);
        assert_eq!(sections["s"].get("a"), None);
        assert_eq!(sections["s"].get("b"), Some("2"));
        assert!(sections["other"].is_empty());
    }

    #[test]
    fn header_registers_empty_section() {
        init();
        let sections = parse_lines(&["[empty]"]);
        assert!(sections.contains_key("empty"));
        assert!(sections["empty"].is_empty());
    }

    #[test]
    fn odd_lines() {
        init();
        let sections = parse_lines(&["[s]", "[", "]", "novalue", "= anonymous", "k ="]);
        let s = &sections["s"];
        assert_eq!(s.get("["), Some(""));
        assert_eq!(s.get("]"), Some(""));
        assert_eq!(s.get("novalue"), Some(""));
        assert_eq!(s.get(""), Some("anonymous"));
        assert_eq!(s.get("k"), Some(""));
    }

    #[test]
    fn empty_header_is_ignored() {
        init();
        let sections = parse_lines(&["[s]", "a = 1", "[]", "b = 2"]);
        assert_eq!(sections.len(), 1);
        assert!(!sections.contains_key(""));
        assert_eq!(sections["s"].get("b"), None);
    }

    #[test]
    fn header_name_is_taken_verbatim() {
        init();
        let sections = parse_lines(&["[ spaced name ]", "k = v", "[a=b]", "x = y"]);
        assert_eq!(sections[" spaced name "].get("k"), Some("v"));
        assert_eq!(sections["a=b"].get("x"), Some("y"));
    }
}
