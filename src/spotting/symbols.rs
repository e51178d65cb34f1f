use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::error::SpottingError;

const TABLE_CONTEXT: &str = "symbol table";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// CTC blank: no new character at this time step.
    Blank,
    Space,
    Char(char),
    /// Multi-character recognizer token such as `<$>`.
    Control(String),
}

impl Symbol {
    pub const BLANK_TOKEN: &'static str = "<ctc>";
    pub const SPACE_TOKEN: &'static str = "<space>";

    pub fn from_token(token: &str) -> Self {
        match token {
            Self::BLANK_TOKEN => Self::Blank,
            Self::SPACE_TOKEN => Self::Space,
            _ => {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(' '), None) => Self::Space,
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Control(token.to_string()),
                }
            }
        }
    }

    pub fn token(&self) -> String {
        match self {
            Self::Blank => Self::BLANK_TOKEN.to_string(),
            Self::Space => Self::SPACE_TOKEN.to_string(),
            Self::Char(c) => c.to_string(),
            Self::Control(token) => token.clone(),
        }
    }
}

/// Bidirectional mapping between matrix columns and recognizer symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable {
    by_code: BTreeMap<usize, Symbol>,
    by_char: HashMap<char, usize>,
    blank: usize,
    space: Option<usize>,
}

impl SymbolTable {
    pub fn new(entries: impl IntoIterator<Item = (usize, Symbol)>) -> Result<Self, SpottingError> {
        let mut by_code = BTreeMap::new();
        let mut by_char = HashMap::new();
        let mut blank = None;
        let mut space = None;

        for (code, symbol) in entries {
            match &symbol {
                Symbol::Blank => {
                    if blank.replace(code).is_some() {
                        return Err(SpottingError::malformed(
                            TABLE_CONTEXT,
                            "more than one blank symbol",
                        ));
                    }
                }
                Symbol::Space => {
                    if space.replace(code).is_some() {
                        return Err(SpottingError::malformed(
                            TABLE_CONTEXT,
                            "more than one space symbol",
                        ));
                    }
                }
                // Lowest code wins when a recognizer lists a character twice.
                Symbol::Char(c) => {
                    by_char
                        .entry(*c)
                        .and_modify(|existing: &mut usize| *existing = (*existing).min(code))
                        .or_insert(code);
                }
                Symbol::Control(_) => {}
            }
            if by_code.insert(code, symbol).is_some() {
                return Err(SpottingError::malformed(
                    TABLE_CONTEXT,
                    format!("duplicate code {code}"),
                ));
            }
        }

        let blank = blank.ok_or_else(|| {
            SpottingError::malformed(TABLE_CONTEXT, "no blank (<ctc>) symbol")
        })?;
        Ok(Self {
            by_code,
            by_char,
            blank,
            space,
        })
    }

    /// Parses a recognizer symbol list: one `token<TAB>code` pair per line.
    pub fn parse(text: &str) -> Result<Self, SpottingError> {
        let mut entries = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (token, code) = line.rsplit_once('\t').ok_or_else(|| {
                SpottingError::malformed(
                    TABLE_CONTEXT,
                    format!("line {}: expected '<token>\\t<code>'", line_no + 1),
                )
            })?;
            let code = code.trim().parse::<usize>().map_err(|e| {
                SpottingError::malformed(TABLE_CONTEXT, format!("line {}: {e}", line_no + 1))
            })?;
            entries.push((code, Symbol::from_token(token)));
        }
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self, SpottingError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SpottingError::io("read symbols.txt", e))?;
        Self::parse(&data)
    }

    pub fn blank(&self) -> usize {
        self.blank
    }

    pub fn space(&self) -> Option<usize> {
        self.space
    }

    pub fn symbol(&self, code: usize) -> Option<&Symbol> {
        self.by_code.get(&code)
    }

    pub fn code_of(&self, c: char) -> Option<usize> {
        if c == ' ' {
            return self.space;
        }
        self.by_char.get(&c).copied()
    }

    /// Number of matrix columns the table addresses.
    pub fn width(&self) -> usize {
        self.by_code.keys().next_back().map_or(0, |&max| max + 1)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Tokens in code order; identifies the table for matrix caching.
    pub fn fingerprint(&self) -> String {
        self.by_code.values().map(Symbol::token).collect()
    }

    /// Resolves each character of `word` to its code. Characters missing from
    /// the table fall back to the space code.
    pub fn resolve_query(&self, word: &str) -> Query {
        let mut codes = Vec::with_capacity(word.chars().count());
        for c in word.chars() {
            if let Some(code) = self.code_of(c) {
                codes.push(code);
                continue;
            }
            match self.space {
                Some(space) => {
                    tracing::debug!(
                        character = %c,
                        query = word,
                        "symbols: character not in table, using space"
                    );
                    codes.push(space);
                }
                None => tracing::warn!(
                    character = %c,
                    query = word,
                    "symbols: character not in table and no space symbol, dropping it"
                ),
            }
        }
        Query {
            text: word.to_string(),
            codes,
        }
    }

    /// Keeps only `keep` plus blank and space, renumbered densely in
    /// ascending order of the original codes. Returns the reduced table and,
    /// for each new code, the original column it came from.
    pub fn project(&self, keep: &BTreeSet<usize>) -> Result<(Self, Vec<usize>), SpottingError> {
        let columns: Vec<usize> = self
            .by_code
            .keys()
            .copied()
            .filter(|code| keep.contains(code) || *code == self.blank || Some(*code) == self.space)
            .collect();
        let table = Self::new(
            columns
                .iter()
                .enumerate()
                .map(|(new_code, old_code)| (new_code, self.by_code[old_code].clone())),
        )?;
        Ok((table, columns))
    }
}

/// One search word resolved against a symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    /// Symbol code for each query position.
    pub codes: Vec<usize>,
}

impl Query {
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Splits a comma-separated query string and resolves every word.
    pub fn parse_list(raw: &str, table: &SymbolTable) -> Vec<Query> {
        split_query_words(raw)
            .map(|word| table.resolve_query(word))
            .filter(|query| !query.is_empty())
            .collect()
    }
}

pub fn split_query_words(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|word| !word.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SymbolTable {
        SymbolTable::parse("<ctc>\t0\n<space>\t1\na\t2\nb\t3\n<$>\t4\n-\t5\n").expect("valid symbols")
    }

    #[test]
    fn parse_identifies_blank_and_space() {
        let t = table();
        assert_eq!(t.blank(), 0);
        assert_eq!(t.space(), Some(1));
        assert_eq!(t.code_of('a'), Some(2));
        assert_eq!(t.code_of('-'), Some(5));
        assert_eq!(t.symbol(4), Some(&Symbol::Control("<$>".to_string())));
        assert_eq!(t.width(), 6);
    }

    #[test]
    fn parse_rejects_missing_blank() {
        let result = SymbolTable::parse("a\t0\nb\t1\n");
        assert!(matches!(result, Err(SpottingError::MalformedInput { .. })));
    }

    #[test]
    fn parse_rejects_duplicate_codes_and_bad_lines() {
        assert!(SymbolTable::parse("<ctc>\t0\na\t0\n").is_err());
        assert!(SymbolTable::parse("<ctc>\t0\na 1\n").is_err());
        assert!(SymbolTable::parse("<ctc>\t0\na\tx\n").is_err());
    }

    #[test]
    fn unknown_query_character_falls_back_to_space() {
        let query = table().resolve_query("aXb");
        assert_eq!(query.codes, vec![2, 1, 3]);
        assert_eq!(query.text, "aXb");
    }

    #[test]
    fn unknown_character_without_space_is_dropped() {
        let t = SymbolTable::parse("<ctc>\t0\na\t1\n").expect("valid symbols");
        assert_eq!(t.resolve_query("aZa").codes, vec![1, 1]);
    }

    #[test]
    fn parse_list_splits_and_trims() {
        let queries = Query::parse_list(" ab , ba,,", &table());
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].text, "ab");
        assert_eq!(queries[1].codes, vec![3, 2]);
    }

    #[test]
    fn project_keeps_blank_space_and_requested_codes() {
        let keep = BTreeSet::from([3usize]);
        let (projected, columns) = table().project(&keep).expect("projection");
        assert_eq!(columns, vec![0, 1, 3]);
        assert_eq!(projected.blank(), 0);
        assert_eq!(projected.space(), Some(1));
        assert_eq!(projected.code_of('b'), Some(2));
        assert_eq!(projected.code_of('a'), None);
    }

    #[test]
    fn fingerprint_changes_with_projection() {
        let t = table();
        let (projected, _) = t.project(&BTreeSet::from([2usize])).expect("projection");
        assert_ne!(t.fingerprint(), projected.fingerprint());
    }
}
