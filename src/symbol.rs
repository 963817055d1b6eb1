//! Grammar symbols: terminal and nonterminal names, plus the two reserved
//! sentinels every grammar carries implicitly.
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Name of the synthesized top rule wrapping the user's start symbol.
pub const START: &str = "<start>";
/// Name of the end-of-input sentinel symbol.
pub const END: &str = "<end>";

/// An identifier of a terminal or nonterminal. Cheap to clone (an `Rc<str>`
/// under the hood) and compares/hashes by name, matching the data model's
/// "compare by identity of name".
#[derive(Debug, Clone, Eq)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    pub fn start() -> Self {
        Self(Rc::from(START))
    }

    pub fn end() -> Self {
        Self(Rc::from(END))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_start(&self) -> bool {
        &*self.0 == START
    }

    pub fn is_end(&self) -> bool {
        &*self.0 == END
    }

    /// The name shown to users in `expected`/`received` error fields: the
    /// `<end>` sentinel renders as `"END"`, everything else renders as its
    /// own name.
    pub fn display_name(&self) -> String {
        if self.is_end() {
            "END".to_string()
        } else {
            self.0.to_string()
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Symbol(Rc::from(name.as_str()))
    }
}
