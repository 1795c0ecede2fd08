//! Iteration-variable scopes and the readers that consult them.
//!
//! A `forEach` pushes `{item, index}` bindings before resolving its template.
//! Frames stack: an inner frame shadows only the names it binds, so nested
//! iterations still see the outer variables.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::document::value::StateValue;
use crate::state::{descend, StatePath, StateStore};

/// Read access to state by path string. The evaluator only ever reads.
pub trait StateReader {
    fn read(&self, path: &str) -> Option<StateValue>;
}

impl StateReader for StateStore {
    fn read(&self, path: &str) -> Option<StateValue> {
        self.get(path).cloned()
    }
}

impl<T: StateReader + ?Sized> StateReader for &T {
    fn read(&self, path: &str) -> Option<StateValue> {
        (**self).read(path)
    }
}

/// One bound iteration variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeEntry {
    pub value: StateValue,
    /// Where the value lives in the store, if anywhere. `item` bound from
    /// `items[2]` has source `items[2]`; an index has none.
    pub source: Option<StatePath>,
}

impl ScopeEntry {
    pub fn new(value: StateValue, source: Option<StatePath>) -> Self {
        Self { value, source }
    }
}

/// A scope lookup hit: the value (absent if the path descends past it) and
/// the store path it maps to.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeHit {
    pub value: Option<StateValue>,
    pub source: Option<StatePath>,
}

/// Stack of iteration frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scope {
    frames: Vec<BTreeMap<String, ScopeEntry>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bindings: impl IntoIterator<Item = (String, ScopeEntry)>) {
        self.frames.push(bindings.into_iter().collect());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn entry(&self, name: &str) -> Option<&ScopeEntry> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Look `path` up by its root key. `None` means the root is not bound
    /// and the caller should go to the store.
    pub fn lookup(&self, path: &StatePath) -> Option<ScopeHit> {
        let entry = self.entry(path.root_key()?)?;
        let rest = path.skip(1);
        Some(ScopeHit {
            value: descend(&entry.value, rest.segments()).cloned(),
            source: entry.source.clone().map(|source| source.join(&rest)),
        })
    }

    /// A copy whose store-backed entries are re-read from `state`.
    pub fn refreshed(&self, state: &dyn StateReader) -> Scope {
        let frames = self
            .frames
            .iter()
            .map(|frame| {
                frame
                    .iter()
                    .map(|(name, entry)| {
                        let value = match &entry.source {
                            Some(source) => state.read(&source.to_string()).unwrap_or_default(),
                            None => entry.value.clone(),
                        };
                        (name.clone(), ScopeEntry::new(value, entry.source.clone()))
                    })
                    .collect()
            })
            .collect();
        Scope { frames }
    }

    /// Map `path` onto the store: scope-rooted paths are rewritten through
    /// their source, other paths are returned as-is. Returns `None` for a
    /// scope variable with no store location.
    pub fn source_path(&self, path: &StatePath) -> Option<StatePath> {
        match self.lookup(path) {
            Some(hit) => hit.source,
            None => Some(path.clone()),
        }
    }
}

/// Reads iteration variables first, then the underlying state. Every read
/// that maps to a store location is recorded, so a resolver can learn which
/// paths a node depends on.
pub struct ScopedReader<'a> {
    scope: &'a Scope,
    state: &'a dyn StateReader,
    reads: RefCell<Vec<StatePath>>,
}

impl<'a> ScopedReader<'a> {
    pub fn new(scope: &'a Scope, state: &'a dyn StateReader) -> Self {
        Self {
            scope,
            state,
            reads: RefCell::new(Vec::new()),
        }
    }

    /// Store paths read so far, in read order, deduplicated.
    pub fn take_reads(&self) -> Vec<StatePath> {
        let mut reads = self.reads.take();
        let mut seen = std::collections::BTreeSet::new();
        reads.retain(|path| seen.insert(path.clone()));
        reads
    }

    fn record(&self, path: StatePath) {
        self.reads.borrow_mut().push(path);
    }
}

impl StateReader for ScopedReader<'_> {
    fn read(&self, path: &str) -> Option<StateValue> {
        let parsed = StatePath::parse(path).ok()?;
        if let Some(hit) = self.scope.lookup(&parsed) {
            if let Some(source) = hit.source {
                self.record(source);
            }
            return hit.value;
        }
        self.record(parsed.clone());
        self.state.read(&parsed.to_string())
    }
}
