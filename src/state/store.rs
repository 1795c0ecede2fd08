//! StateStore: path-addressed live state with change notification.
//!
//! A single mutable tree of [`StateValue`]s addressed by dot/bracket paths.
//! Every [`StateStore::set`] stores the value and then synchronously invokes
//! all registered change callbacks, in registration order, before returning.
//! `set` takes `&mut self`, so no other write can interleave with a dispatch;
//! hosts sharing a store across threads wrap it in a single mutex.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::path::{descend, PathSegment, StatePath};
use crate::document::value::{StateValue, ValueKind};

/// Errors from state access.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid state path: {0:?}")]
    InvalidPath(String),
    #[error("index {index} in {path:?} is too far past the end of an array of {len}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("typed state must serialize to an object, got {0}")]
    NotAnObject(ValueKind),
    #[error("typed state conversion failed: {0}")]
    Conversion(#[from] serde_json::Error),
}

/// Most null padding a single indexed write may add to an array.
pub const MAX_INDEX_GAP: usize = 1024;

/// A single change delivered to callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateChange<'a> {
    pub path: &'a str,
    /// The value before the write; `None` if the path was absent.
    pub old_value: Option<&'a StateValue>,
    pub new_value: &'a StateValue,
}

/// Handle returned by [`StateStore::on_state_change`]. Pass it back to
/// [`StateStore::remove_state_change_callback`] on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type StateCallback = Box<dyn FnMut(&StateChange<'_>)>;

/// Live state for one render session.
#[derive(Default)]
pub struct StateStore {
    values: BTreeMap<String, StateValue>,
    callbacks: Vec<(SubscriptionId, StateCallback)>,
    next_subscription: u64,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("values", &self.values)
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with initial top-level values. No callbacks fire.
    pub fn with_values(values: BTreeMap<String, StateValue>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    // -- reads ---------------------------------------------------------------

    /// Value at `path`, or `None` if the path is absent or malformed.
    pub fn get(&self, path: &str) -> Option<&StateValue> {
        let path = StatePath::parse(path).ok()?;
        self.get_path(&path)
    }

    /// Value at an already-parsed path.
    pub fn get_path(&self, path: &StatePath) -> Option<&StateValue> {
        let (first, rest) = path.segments().split_first()?;
        match first {
            PathSegment::Key(key) => descend(self.values.get(key)?, rest),
            PathSegment::Index(_) => None,
        }
    }

    /// The array at `path`, if the value there is an array.
    pub fn get_array(&self, path: &str) -> Option<&[StateValue]> {
        self.get(path).and_then(StateValue::as_array)
    }

    /// Whether the array at `path` contains `value`. Absent arrays contain nothing.
    pub fn array_contains(&self, path: &str, value: &StateValue) -> bool {
        self.get_array(path)
            .is_some_and(|items| items.contains(value))
    }

    /// Number of elements of the array at `path`; 0 when absent.
    pub fn array_count(&self, path: &str) -> usize {
        self.get_array(path).map_or(0, <[StateValue]>::len)
    }

    /// The outermost array that a write to `path` would create or lengthen.
    ///
    /// `None` when every index on the path is already in bounds.
    pub fn array_growth(&self, path: &StatePath) -> Option<StatePath> {
        path.segments()
            .iter()
            .enumerate()
            .find_map(|(i, segment)| match segment {
                PathSegment::Index(index) => {
                    let prefix = path.prefix(i);
                    (*index >= self.array_len(&prefix)).then_some(prefix)
                }
                PathSegment::Key(_) => None,
            })
    }

    fn array_len(&self, path: &StatePath) -> usize {
        self.get_path(path)
            .and_then(StateValue::as_array)
            .map_or(0, <[StateValue]>::len)
    }

    /// The whole state as one object value.
    pub fn snapshot(&self) -> StateValue {
        StateValue::Object(self.values.clone())
    }

    /// Read the whole state as a typed structure.
    pub fn get_typed<T: DeserializeOwned>(&self) -> Result<T, StateError> {
        let json = serde_json::Value::from(&self.snapshot());
        Ok(serde_json::from_value(json)?)
    }

    // -- writes --------------------------------------------------------------

    /// Store `value` at `path`, creating intermediate objects and arrays as
    /// needed, then notify every callback with the old and new value.
    pub fn set(&mut self, path: &str, value: impl Into<StateValue>) -> Result<(), StateError> {
        let parsed = StatePath::parse(path)?;
        self.set_path(&parsed, value.into())
    }

    /// [`set`](Self::set) for an already-parsed path.
    ///
    /// An index more than [`MAX_INDEX_GAP`] past the end of its array is
    /// rejected before anything is written.
    pub fn set_path(&mut self, path: &StatePath, value: StateValue) -> Result<(), StateError> {
        self.check_indices(path)?;
        let canonical = path.to_string();
        let old_value = self.get_path(path).cloned();
        let new_value = value.clone();
        *self.slot_mut(path)? = value;

        let change = StateChange {
            path: &canonical,
            old_value: old_value.as_ref(),
            new_value: &new_value,
        };
        tracing::trace!(path = %canonical, "state changed");
        for (_, callback) in self.callbacks.iter_mut() {
            callback(&change);
        }
        Ok(())
    }

    /// Flip the boolean at `path`. Absent or non-boolean values become `true`.
    pub fn toggle(&mut self, path: &str) -> Result<bool, StateError> {
        let next = !self.get(path).and_then(StateValue::as_bool).unwrap_or(false);
        self.set(path, next)?;
        Ok(next)
    }

    /// Push `value` onto the array at `path`, creating the array if absent.
    pub fn append_to_array(
        &mut self,
        path: &str,
        value: impl Into<StateValue>,
    ) -> Result<(), StateError> {
        let mut items = self.get_array(path).map(<[_]>::to_vec).unwrap_or_default();
        items.push(value.into());
        self.set(path, items)
    }

    /// Remove every element equal to `value` from the array at `path`.
    /// Returns whether anything was removed.
    pub fn remove_from_array(&mut self, path: &str, value: &StateValue) -> Result<bool, StateError> {
        let Some(items) = self.get_array(path) else {
            return Ok(false);
        };
        let kept: Vec<StateValue> = items.iter().filter(|item| *item != value).cloned().collect();
        if kept.len() == items.len() {
            return Ok(false);
        }
        self.set(path, kept)?;
        Ok(true)
    }

    /// Remove `value` if present, append it otherwise. Returns whether it is
    /// now contained.
    pub fn toggle_in_array(
        &mut self,
        path: &str,
        value: impl Into<StateValue>,
    ) -> Result<bool, StateError> {
        let value = value.into();
        if self.remove_from_array(path, &value)? {
            Ok(false)
        } else {
            self.append_to_array(path, value)?;
            Ok(true)
        }
    }

    /// Write a typed structure back into the store. One callback dispatch
    /// happens per top-level key whose value changed; keys the structure does
    /// not mention are left alone.
    pub fn set_typed<T: Serialize>(&mut self, value: &T) -> Result<(), StateError> {
        let entries = match StateValue::from(serde_json::to_value(value)?) {
            StateValue::Object(entries) => entries,
            other => return Err(StateError::NotAnObject(other.kind())),
        };
        for (key, value) in entries {
            if self.values.get(&key) != Some(&value) {
                self.set_path(&StatePath::default().key(key), value)?;
            }
        }
        Ok(())
    }

    // -- subscriptions -------------------------------------------------------

    /// Register a change callback. Callbacks run in registration order.
    pub fn on_state_change(
        &mut self,
        callback: impl FnMut(&StateChange<'_>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Unregister a callback. Returns `false` if the id was unknown.
    pub fn remove_state_change_callback(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.callbacks.len()
    }

    // -- internals -----------------------------------------------------------

    fn check_indices(&self, path: &StatePath) -> Result<(), StateError> {
        for (i, segment) in path.segments().iter().enumerate() {
            if let PathSegment::Index(index) = segment {
                let len = self.array_len(&path.prefix(i));
                if *index > len.saturating_add(MAX_INDEX_GAP) {
                    return Err(StateError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                        len,
                    });
                }
            }
        }
        Ok(())
    }

    /// Mutable slot at `path`, coercing intermediates into containers.
    fn slot_mut(&mut self, path: &StatePath) -> Result<&mut StateValue, StateError> {
        let mut segments = path.segments().iter();
        let mut current = match segments.next() {
            Some(PathSegment::Key(key)) => self.values.entry(key.clone()).or_default(),
            _ => return Err(StateError::InvalidPath(path.to_string())),
        };
        for segment in segments {
            current = match segment {
                PathSegment::Key(key) => coerce_object(current).entry(key.clone()).or_default(),
                PathSegment::Index(index) => {
                    let items = coerce_array(current);
                    let len = items.len();
                    if len <= *index {
                        let padded = index.checked_add(1).ok_or_else(|| {
                            StateError::IndexOutOfRange {
                                path: path.to_string(),
                                index: *index,
                                len,
                            }
                        })?;
                        items.resize(padded, StateValue::Null);
                    }
                    &mut items[*index]
                }
            };
        }
        Ok(current)
    }
}

fn coerce_object(value: &mut StateValue) -> &mut BTreeMap<String, StateValue> {
    if !matches!(value, StateValue::Object(_)) {
        *value = StateValue::object();
    }
    match value {
        StateValue::Object(map) => map,
        _ => unreachable!("value was coerced to an object"),
    }
}

fn coerce_array(value: &mut StateValue) -> &mut Vec<StateValue> {
    if !matches!(value, StateValue::Array(_)) {
        *value = StateValue::Array(Vec::new());
    }
    match value {
        StateValue::Array(items) => items,
        _ => unreachable!("value was coerced to an array"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> StateStore {
        let mut store = StateStore::new();
        store.set("count", 5).unwrap();
        store
            .set(
                "items",
                vec![StateValue::from("a"), StateValue::from("b"), StateValue::from("c")],
            )
            .unwrap();
        store
    }

    #[test]
    fn get_and_set_top_level() {
        let store = store();
        assert_eq!(store.get("count"), Some(&StateValue::Int(5)));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn set_creates_intermediate_containers() {
        let mut store = StateStore::new();
        store.set("user.profile.name", "Ada").unwrap();
        store.set("user.tags[1]", "x").unwrap();
        assert_eq!(store.get("user.profile.name"), Some(&StateValue::from("Ada")));
        assert_eq!(store.get("user.tags[0]"), Some(&StateValue::Null));
        assert_eq!(store.get("user.tags[1]"), Some(&StateValue::from("x")));
    }

    #[test]
    fn set_replaces_scalar_intermediate() {
        let mut store = StateStore::new();
        store.set("a", 1).unwrap();
        store.set("a.b", 2).unwrap();
        assert_eq!(store.get("a.b"), Some(&StateValue::Int(2)));
    }

    #[test]
    fn indexed_reads() {
        let store = store();
        assert_eq!(store.get("items[1]"), Some(&StateValue::from("b")));
        assert_eq!(store.get("items[9]"), None);
        assert_eq!(store.get("count[0]"), None);
    }

    #[test]
    fn array_helpers() {
        let store = store();
        assert_eq!(store.array_count("items"), 3);
        assert_eq!(store.array_count("nothing"), 0);
        assert!(store.array_contains("items", &StateValue::from("b")));
        assert!(!store.array_contains("items", &StateValue::from("z")));
        assert!(store.get_array("count").is_none());
    }

    #[test]
    fn array_mutators() {
        let mut store = store();
        store.append_to_array("items", "d").unwrap();
        assert_eq!(store.array_count("items"), 4);
        assert!(store.remove_from_array("items", &StateValue::from("a")).unwrap());
        assert!(!store.remove_from_array("items", &StateValue::from("a")).unwrap());
        assert!(!store.toggle_in_array("items", "b").unwrap());
        assert!(store.toggle_in_array("items", "b").unwrap());
        assert_eq!(store.array_count("items"), 3);
        store.append_to_array("fresh", 1).unwrap();
        assert_eq!(store.array_count("fresh"), 1);
    }

    #[test]
    fn toggle_flips_booleans() {
        let mut store = StateStore::new();
        assert!(store.toggle("flag").unwrap());
        assert!(!store.toggle("flag").unwrap());
        assert_eq!(store.get("flag"), Some(&StateValue::Bool(false)));
    }

    #[test]
    fn invalid_path_is_an_error() {
        let mut store = StateStore::new();
        assert!(matches!(store.set("a..b", 1), Err(StateError::InvalidPath(_))));
    }

    #[test]
    fn callbacks_run_in_registration_order_with_old_and_new() {
        let mut store = StateStore::new();
        store.set("x", 0).unwrap();
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        let first = log.clone();
        store.on_state_change(move |change| {
            first.borrow_mut().push(format!(
                "c1 {} {:?} {:?}",
                change.path, change.old_value, change.new_value
            ));
        });
        let second = log.clone();
        store.on_state_change(move |change| {
            second.borrow_mut().push(format!("c2 {}", change.path));
        });

        store.set("x", 1).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                "c1 x Some(Int(0)) Int(1)".to_string(),
                "c2 x".to_string(),
            ]
        );
    }

    #[test]
    fn callbacks_fire_for_absent_old_value() {
        let mut store = StateStore::new();
        let seen = Rc::new(RefCell::new(None));
        let seen_c = seen.clone();
        store.on_state_change(move |change| {
            *seen_c.borrow_mut() = Some(change.old_value.is_none());
        });
        store.set("new", true).unwrap();
        assert_eq!(*seen.borrow(), Some(true));
    }

    #[test]
    fn removed_callbacks_stop_firing() {
        let mut store = StateStore::new();
        let count = Rc::new(RefCell::new(0));
        let count_c = count.clone();
        let id = store.on_state_change(move |_| *count_c.borrow_mut() += 1);
        store.set("a", 1).unwrap();
        assert!(store.remove_state_change_callback(id));
        assert!(!store.remove_state_change_callback(id));
        store.set("a", 2).unwrap();
        assert_eq!(*count.borrow(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: i64,
        ratio: f64,
        label: String,
        enabled: bool,
        tags: Vec<String>,
    }

    #[test]
    fn typed_round_trip_is_lossless() {
        let mut store = StateStore::new();
        let typed = Counter {
            count: 3,
            ratio: 2.0,
            label: "x".into(),
            enabled: true,
            tags: vec!["a".into()],
        };
        store.set_typed(&typed).unwrap();
        assert_eq!(store.get("count"), Some(&StateValue::Int(3)));
        assert_eq!(store.get("ratio"), Some(&StateValue::Double(2.0)));
        let back: Counter = store.get_typed().unwrap();
        assert_eq!(back, typed);
    }

    #[test]
    fn set_typed_only_notifies_changed_keys() {
        let mut store = StateStore::new();
        let typed = Counter {
            count: 1,
            ratio: 0.5,
            label: "a".into(),
            enabled: false,
            tags: vec![],
        };
        store.set_typed(&typed).unwrap();

        let paths = Rc::new(RefCell::new(Vec::new()));
        let paths_c = paths.clone();
        store.on_state_change(move |change| paths_c.borrow_mut().push(change.path.to_owned()));
        store
            .set_typed(&Counter {
                count: 2,
                ..typed
            })
            .unwrap();
        assert_eq!(*paths.borrow(), vec!["count".to_string()]);
    }

    #[test]
    fn set_typed_rejects_non_objects() {
        let mut store = StateStore::new();
        assert!(matches!(store.set_typed(&5), Err(StateError::NotAnObject(ValueKind::Int))));
    }

    #[test]
    fn huge_index_is_rejected_without_writing() {
        let mut store = store();
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        store.on_state_change(move |_| *sink.borrow_mut() += 1);

        assert!(matches!(
            store.set("a[18446744073709551615]", 1),
            Err(StateError::IndexOutOfRange { len: 0, .. })
        ));
        assert!(matches!(
            store.set("items[1000000000000]", 1),
            Err(StateError::IndexOutOfRange { len: 3, .. })
        ));
        assert!(matches!(
            store.set("fresh.list[5000].name", "x"),
            Err(StateError::IndexOutOfRange { .. })
        ));
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("fresh"), None);
        assert_eq!(store.array_count("items"), 3);
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn padding_within_the_gap_is_allowed() {
        let mut store = store();
        let index = 3 + MAX_INDEX_GAP;
        store.set(&format!("items[{index}]"), "z").unwrap();
        assert_eq!(store.array_count("items"), index + 1);
        assert_eq!(store.get("items[4]"), Some(&StateValue::Null));
    }

    #[test]
    fn array_growth_finds_the_outermost_lengthened_array() {
        let store = store();
        let path = |raw: &str| StatePath::parse(raw).unwrap();
        assert_eq!(store.array_growth(&path("items[2]")), None);
        assert_eq!(store.array_growth(&path("count")), None);
        assert_eq!(store.array_growth(&path("items[3]")), Some(path("items")));
        assert_eq!(store.array_growth(&path("rows[0].cells[1]")), Some(path("rows")));
    }

    #[test]
    fn snapshot_contains_everything() {
        let store = store();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.as_object().map(BTreeMap::len), Some(2));
    }
}
