use crate::Record;

/// Case-insensitive substring match of the industry class against a set of
/// keywords. With no keywords nothing matches.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    /// Blank keywords are dropped since they would match every record.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        KeywordFilter { keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        let Some(class) = record.industry_class() else {
            return false;
        };
        let class = class.to_lowercase();
        self.keywords.iter().any(|k| class.contains(k.as_str()))
    }

    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
