//! Section number representation

/// Section number representation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SectionNumber {
    /// Number components (e.g., [1, 2, 3] for "1.2.3")
    pub parts: Vec<u32>,
}

impl SectionNumber {
    /// Number of a first-level section
    pub fn top(n: u32) -> Self {
        Self { parts: vec![n] }
    }

    /// Number of the `n`th numbered child of this section
    pub fn child(&self, n: u32) -> Self {
        let mut parts = self.parts.clone();
        parts.push(n);
        Self { parts }
    }

    /// Numeral followed by a trailing delimiter, e.g. "1.2." for `delimiter = '.'`
    pub fn sectnum(&self, delimiter: char) -> String {
        let mut s = self.to_string_with(delimiter);
        s.push(delimiter);
        s
    }

    /// Roman numeral of the last component followed by `delimiter`
    ///
    /// Parts are numbered with roman numerals, e.g. "IV:".
    pub fn roman_sectnum(&self, delimiter: char) -> String {
        let n = self.parts.last().copied().unwrap_or(0);
        format!("{}{}", to_roman(n), delimiter)
    }

    fn to_string_with(&self, delimiter: char) -> String {
        self.parts
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(&delimiter.to_string())
    }
}

impl std::fmt::Display for SectionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_with('.'))
    }
}

/// Upper-case roman numeral; zero renders as an empty string
pub fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (value, numeral) in TABLE {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}
