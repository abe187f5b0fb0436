use std::collections::BTreeSet;

/// An ordered, deduplicated set of text insertions.
///
/// Two declarators sharing one base specifier (`int x, y;`) request the same insertion twice;
/// set semantics collapse them into a single token, which is also the correct C reading since
/// the one specifier types both names. Application walks the source once, lowest offset first.
#[derive(Clone, Debug, Default)]
pub struct PatchSet {
    insertions: BTreeSet<(u32, String)>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `text` to be inserted immediately after byte `offset`.
    pub fn insert_after(&mut self, offset: u32, text: impl Into<String>) {
        self.insertions.insert((offset, text.into()));
    }

    pub fn len(&self) -> usize {
        self.insertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    pub fn apply(&self, source: &str) -> String {
        let added: usize = self.insertions.iter().map(|(_, text)| text.len()).sum();
        let mut output = String::with_capacity(source.len() + added);
        let mut consumed = 0usize;
        for (offset, text) in &self.insertions {
            let offset = (*offset as usize).min(source.len());
            output.push_str(&source[consumed..offset]);
            output.push_str(text);
            consumed = offset;
        }
        output.push_str(&source[consumed..]);
        output
    }
}
