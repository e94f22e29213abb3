//! # Declarative Value Binding
//!
//! ## Purpose
//!
//! A [`Binding`] pairs a query key with a destination slot, the slot's
//! capacity and the JSON kind the value must have. The loader searches a
//! validated [`Document`] for each binding's key, converts the value to the
//! slot's native form and commits it only when every check passes.
//!
//! ## Per-pass state machine
//!
//! ```text
//! Unbound ──search──► Bound
//!                  ├► Unfound         key absent
//!                  ├► Malformed       document, conversion or slot defect
//!                  ├► LengthExceeded  string does not fit with terminator
//!                  └► TypeMismatch    wrong kind, or a container value
//! ```
//!
//! Every load resets the binding to `Unbound` first, so a binding is only
//! ever `Bound` by the most recent pass. Failures are local: they are logged
//! and counted, and never stop the remaining bindings in the pass.
//!
//! ## Conversion rules
//!
//! - **String**: raw bytes between the quotes, no unescaping, committed only
//!   when `len < capacity`
//! - **Number**: base-10 `i32`; fractions and exponents are truncated with a
//!   warning (see [`crate::number`])
//! - **Object / Array**: logged for inspection, never bound
//! - **True / False / Null**: always a type mismatch

use tracing::{debug, error, info, warn};
use types::{FixedStr, JsonType, SlotRef, Value, INSPECT_SEGMENT_BYTES, MAX_KEY_LEN};

use crate::buffers::StagingBuffer;
use crate::error::{BindError, BindResult, ScanError};
use crate::number::{parse_integer, IntegerParse};
use crate::parser::Document;

/// Bounded, fully-namespaced search key
pub type QueryKey = FixedStr<MAX_KEY_LEN>;

/// Whether an absent key is worth a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Necessity {
    Optional,
    Required,
}

/// Outcome of the most recent load pass for one binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindState {
    #[default]
    Unbound,
    Bound,
    Unfound,
    Malformed,
    LengthExceeded,
    TypeMismatch,
}

impl BindState {
    pub const fn name(self) -> &'static str {
        match self {
            BindState::Unbound => "Unbound",
            BindState::Bound => "Bound",
            BindState::Unfound => "Unfound",
            BindState::Malformed => "Malformed",
            BindState::LengthExceeded => "LengthExceeded",
            BindState::TypeMismatch => "TypeMismatch",
        }
    }

    fn for_error(err: &BindError) -> Self {
        match err {
            BindError::Search(ScanError::KeyNotFound { .. }) => BindState::Unfound,
            BindError::Search(_) | BindError::Conversion { .. } | BindError::MissingSlot { .. } => {
                BindState::Malformed
            }
            BindError::LengthExceeded { .. } => BindState::LengthExceeded,
            BindError::TypeMismatch { .. } | BindError::ContainerValue { .. } => {
                BindState::TypeMismatch
            }
        }
    }
}

/// Destination storage addressed by [`SlotRef`]
pub trait BindingTarget {
    fn slot_mut(&mut self, slot: SlotRef) -> Option<&mut Value>;
}

impl BindingTarget for [Value] {
    fn slot_mut(&mut self, slot: SlotRef) -> Option<&mut Value> {
        self.get_mut(slot.index())
    }
}

impl BindingTarget for Vec<Value> {
    fn slot_mut(&mut self, slot: SlotRef) -> Option<&mut Value> {
        self.as_mut_slice().slot_mut(slot)
    }
}

/// One key-to-slot binding rule
#[derive(Debug, Clone)]
pub struct Binding {
    key: QueryKey,
    slot: SlotRef,
    capacity: usize,
    expected: JsonType,
    state: BindState,
}

impl Binding {
    /// Create a binding; fails if `key` is empty or longer than [`MAX_KEY_LEN`]
    pub fn new(
        key: &str,
        expected: JsonType,
        slot: SlotRef,
        capacity: usize,
    ) -> Result<Self, ScanError> {
        let invalid = || ScanError::KeyInvalid {
            len: key.len(),
            max: MAX_KEY_LEN,
        };
        if key.is_empty() {
            return Err(invalid());
        }
        let key = QueryKey::from_str(key).map_err(|_| invalid())?;

        Ok(Self {
            key,
            slot,
            capacity,
            expected,
            state: BindState::Unbound,
        })
    }

    /// Create a binding whose key is `prefix` followed by `name`
    pub fn namespaced(
        prefix: &str,
        name: &str,
        expected: JsonType,
        slot: SlotRef,
        capacity: usize,
    ) -> Result<Self, ScanError> {
        let key = QueryKey::concat(prefix, name).map_err(|_| ScanError::KeyInvalid {
            len: prefix.len() + name.len(),
            max: MAX_KEY_LEN,
        })?;
        Self::new(key.as_str(), expected, slot, capacity)
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn slot(&self) -> SlotRef {
        self.slot
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn expected(&self) -> JsonType {
        self.expected
    }

    pub fn state(&self) -> BindState {
        self.state
    }

    /// True when the most recent pass committed a value
    pub fn found(&self) -> bool {
        self.state == BindState::Bound
    }

    pub fn reset(&mut self) {
        self.state = BindState::Unbound;
    }
}

/// Load a single binding from `doc` into `target`
///
/// Returns true when a value was committed.
pub fn load_one<T>(
    binding: &mut Binding,
    doc: &Document<'_>,
    target: &mut T,
    necessity: Necessity,
) -> bool
where
    T: BindingTarget + ?Sized,
{
    binding.reset();

    match bind_value(binding, doc, target) {
        Ok(()) => {
            binding.state = BindState::Bound;
            true
        }
        Err(err) => {
            binding.state = BindState::for_error(&err);
            report(binding, &err, necessity);
            false
        }
    }
}

/// Load every binding as required; returns how many were bound
pub fn load_all<T>(bindings: &mut [Binding], doc: &Document<'_>, target: &mut T) -> usize
where
    T: BindingTarget + ?Sized,
{
    load_all_with(bindings, doc, target, Necessity::Required)
}

/// Load every binding with the given necessity; returns how many were bound
pub fn load_all_with<T>(
    bindings: &mut [Binding],
    doc: &Document<'_>,
    target: &mut T,
    necessity: Necessity,
) -> usize
where
    T: BindingTarget + ?Sized,
{
    for binding in bindings.iter_mut() {
        load_one(binding, doc, target, necessity);
    }

    let loaded = bindings.iter().filter(|b| b.found()).count();
    debug!(loaded, total = bindings.len(), "binding pass complete");
    loaded
}

fn bind_value<T>(binding: &Binding, doc: &Document<'_>, target: &mut T) -> BindResult<()>
where
    T: BindingTarget + ?Sized,
{
    let key = binding.key();
    let value = doc.search(key)?;
    debug!(
        key,
        json_type = %value.json_type,
        len = value.len(),
        "query matched"
    );

    let decoded = match value.json_type {
        JsonType::String if binding.expected == JsonType::String => {
            let mut staging = StagingBuffer::new(binding.capacity);
            staging
                .stage(value.bytes)
                .map_err(|e| BindError::LengthExceeded {
                    key: key.to_string(),
                    len: e.len,
                    capacity: e.capacity,
                })?;
            Value::Str(staging.take_string())
        }
        JsonType::Number if binding.expected == JsonType::Number => {
            let parsed = parse_integer(value.bytes).map_err(|source| BindError::Conversion {
                key: key.to_string(),
                source,
            })?;
            if let IntegerParse::Truncated(truncated) = parsed {
                warn!(
                    key,
                    text = value.as_str(),
                    value = truncated,
                    "non-integer number truncated"
                );
            }
            Value::Int(parsed.value())
        }
        JsonType::Object | JsonType::Array => {
            info!(
                key,
                json_type = %value.json_type,
                len = value.len(),
                "container value inspected"
            );
            log_segments(value.bytes);
            return Err(BindError::ContainerValue {
                key: key.to_string(),
                found: value.json_type,
            });
        }
        found => {
            return Err(BindError::TypeMismatch {
                key: key.to_string(),
                expected: binding.expected,
                found,
            })
        }
    };

    let slot = target
        .slot_mut(binding.slot)
        .ok_or_else(|| BindError::MissingSlot {
            key: key.to_string(),
            slot: binding.slot.index(),
        })?;
    *slot = decoded;
    Ok(())
}

fn report(binding: &Binding, err: &BindError, necessity: Necessity) {
    match (err, necessity) {
        (BindError::Search(_), Necessity::Optional) => {}
        (BindError::Search(scan), Necessity::Required) => {
            warn!(key = binding.key(), status = scan.status(), "search failed for required key");
        }
        (BindError::ContainerValue { .. }, _) if binding.expected.is_container() => {
            debug!(key = binding.key(), "container binding inspected only");
        }
        (err, _) => {
            error!(
                key = binding.key(),
                state = binding.state.name(),
                error = %err,
                "binding failed"
            );
        }
    }
}

/// Log a raw value in fixed-size segments
pub fn log_segments(bytes: &[u8]) {
    for (index, chunk) in bytes.chunks(INSPECT_SEGMENT_BYTES).enumerate() {
        debug!(segment = index, text = %String::from_utf8_lossy(chunk), "value bytes");
    }
}

/// A descriptor array together with the total it is expected to satisfy
#[derive(Debug, Clone, Default)]
pub struct BindingSet {
    bindings: Vec<Binding>,
}

impl BindingSet {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Run one required pass; returns the bound count
    pub fn load<T>(&mut self, doc: &Document<'_>, target: &mut T) -> usize
    where
        T: BindingTarget + ?Sized,
    {
        load_all(&mut self.bindings, doc, target)
    }

    /// Run one pass with the given necessity; returns the bound count
    pub fn load_with<T>(&mut self, doc: &Document<'_>, target: &mut T, necessity: Necessity) -> usize
    where
        T: BindingTarget + ?Sized,
    {
        load_all_with(&mut self.bindings, doc, target, necessity)
    }

    pub fn reset_all(&mut self) {
        self.bindings.iter_mut().for_each(Binding::reset);
    }

    pub fn found_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.found()).count()
    }

    pub fn all_found(&self) -> bool {
        self.found_count() == self.bindings.len()
    }

    pub fn get(&self, index: usize) -> Option<&Binding> {
        self.bindings.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ScanLimits;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts warn and error events
    #[derive(Clone, Default)]
    struct DiagnosticCount(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for DiagnosticCount {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() <= tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn diagnostics_during(f: impl FnOnce()) -> usize {
        let count = DiagnosticCount::default();
        let subscriber = tracing_subscriber::registry().with(count.clone());
        tracing::subscriber::with_default(subscriber, f);
        count.0.load(Ordering::SeqCst)
    }

    fn parse(text: &str) -> Document<'_> {
        Document::parse(text.as_bytes(), ScanLimits::default()).unwrap()
    }

    fn int_binding(key: &str, slot: usize) -> Binding {
        Binding::new(key, JsonType::Number, SlotRef(slot), 4).unwrap()
    }

    fn str_binding(key: &str, slot: usize, capacity: usize) -> Binding {
        Binding::new(key, JsonType::String, SlotRef(slot), capacity).unwrap()
    }

    #[test]
    fn test_binding_key_bounds() {
        let at_max = "k".repeat(MAX_KEY_LEN);
        assert!(Binding::new(&at_max, JsonType::Number, SlotRef(0), 4).is_ok());

        let over = "k".repeat(MAX_KEY_LEN + 1);
        assert!(matches!(
            Binding::new(&over, JsonType::Number, SlotRef(0), 4),
            Err(ScanError::KeyInvalid { .. })
        ));
        assert!(Binding::new("", JsonType::Number, SlotRef(0), 4).is_err());

        let b = Binding::namespaced("cfg.", "Port", JsonType::Number, SlotRef(1), 4).unwrap();
        assert_eq!(b.key(), "cfg.Port");
        assert_eq!(b.state(), BindState::Unbound);
    }

    #[test]
    fn test_load_int_and_string() {
        let doc = parse(r#"{"cfg.Port": 8080, "cfg.Name": "node-a"}"#);
        let mut slots = vec![Value::Empty; 3];
        let mut bindings = vec![int_binding("cfg.Port", 1), str_binding("cfg.Name", 2, 64)];

        assert_eq!(load_all(&mut bindings, &doc, &mut slots), 2);
        assert_eq!(slots[1], Value::Int(8080));
        assert_eq!(slots[2], Value::Str("node-a".into()));
        assert!(bindings.iter().all(Binding::found));
    }

    #[test]
    fn test_string_capacity_boundary() {
        let doc = parse(r#"{"fits": "abc", "full": "abcd"}"#);
        let mut slots = vec![Value::Empty; 2];

        let mut fits = str_binding("fits", 0, 4);
        assert!(load_one(&mut fits, &doc, &mut slots, Necessity::Required));
        assert_eq!(slots[0], Value::Str("abc".into()));

        let mut full = str_binding("full", 1, 4);
        assert!(!load_one(&mut full, &doc, &mut slots, Necessity::Required));
        assert_eq!(full.state(), BindState::LengthExceeded);
        assert_eq!(slots[1], Value::Empty);
    }

    #[test]
    fn test_string_copied_without_unescaping() {
        let doc = parse(r#"{"path": "C:\\tmp\n"}"#);
        let mut slots = vec![Value::Empty];
        let mut b = str_binding("path", 0, 64);
        assert!(load_one(&mut b, &doc, &mut slots, Necessity::Required));
        assert_eq!(slots[0], Value::Str(r"C:\\tmp\n".into()));
    }

    #[test]
    fn test_number_conversion_outcomes() {
        let doc = parse(r#"{"exact": 42, "frac": 3.14, "big": 4294967296, "neg": -7}"#);
        let mut slots = vec![Value::Empty; 4];

        let mut exact = int_binding("exact", 0);
        assert!(load_one(&mut exact, &doc, &mut slots, Necessity::Required));
        assert_eq!(slots[0], Value::Int(42));

        // Fractions bind their integer part; the warning is the only signal.
        let mut frac = int_binding("frac", 1);
        assert!(load_one(&mut frac, &doc, &mut slots, Necessity::Required));
        assert_eq!(slots[1], Value::Int(3));

        let mut big = int_binding("big", 2);
        assert!(!load_one(&mut big, &doc, &mut slots, Necessity::Required));
        assert_eq!(big.state(), BindState::Malformed);
        assert_eq!(slots[2], Value::Empty);

        let mut neg = int_binding("neg", 3);
        assert!(load_one(&mut neg, &doc, &mut slots, Necessity::Required));
        assert_eq!(slots[3], Value::Int(-7));
    }

    #[test]
    fn test_number_text_in_string_is_type_mismatch() {
        let doc = parse(r#"{"port": "12abc"}"#);
        let mut slots = vec![Value::Empty];
        let mut b = int_binding("port", 0);
        assert!(!load_one(&mut b, &doc, &mut slots, Necessity::Required));
        assert_eq!(b.state(), BindState::TypeMismatch);
    }

    #[test]
    fn test_literals_and_containers_never_bind() {
        let doc = parse(r#"{"t": true, "n": null, "o": {"x": 1}, "a": [1, 2]}"#);
        let mut slots = vec![Value::Empty; 4];

        for (i, key) in ["t", "n", "o", "a"].into_iter().enumerate() {
            let mut b = int_binding(key, i);
            assert!(!load_one(&mut b, &doc, &mut slots, Necessity::Required));
            assert_eq!(b.state(), BindState::TypeMismatch, "{key}");
        }

        let mut obj = Binding::new("o", JsonType::Object, SlotRef(2), 64).unwrap();
        assert!(!load_one(&mut obj, &doc, &mut slots, Necessity::Required));
        assert!(slots.iter().all(Value::is_empty));
    }

    #[test]
    fn test_missing_key_state_and_necessity() {
        let doc = parse(r#"{"present": 1}"#);
        let mut slots = vec![Value::Empty];

        let mut required = int_binding("absent", 0);
        assert!(!load_one(&mut required, &doc, &mut slots, Necessity::Required));
        assert_eq!(required.state(), BindState::Unfound);

        let mut optional = int_binding("absent", 0);
        assert!(!load_one(&mut optional, &doc, &mut slots, Necessity::Optional));
        assert_eq!(optional.state(), BindState::Unfound);
    }

    #[test]
    fn test_only_required_misses_are_reported() {
        let doc = parse(r#"{"present": "text"}"#);
        let mut slots = vec![Value::Empty];

        let required = diagnostics_during(|| {
            let mut b = int_binding("absent", 0);
            load_one(&mut b, &doc, &mut slots, Necessity::Required);
        });
        assert_eq!(required, 1);

        let optional = diagnostics_during(|| {
            let mut b = int_binding("absent", 0);
            load_one(&mut b, &doc, &mut slots, Necessity::Optional);
        });
        assert_eq!(optional, 0);

        // Optional only silences the miss, not a bad value.
        let mismatch = diagnostics_during(|| {
            let mut b = int_binding("present", 0);
            load_one(&mut b, &doc, &mut slots, Necessity::Optional);
            assert_eq!(b.state(), BindState::TypeMismatch);
        });
        assert_eq!(mismatch, 1);
    }

    #[test]
    fn test_missing_slot_is_malformed() {
        let doc = parse(r#"{"k": 1}"#);
        let mut slots: Vec<Value> = Vec::new();
        let mut b = int_binding("k", 5);
        assert!(!load_one(&mut b, &doc, &mut slots, Necessity::Required));
        assert_eq!(b.state(), BindState::Malformed);
    }

    #[test]
    fn test_reload_resets_found_flag() {
        let mut slots = vec![Value::Empty];
        let mut bindings = vec![int_binding("k", 0)];

        let first = parse(r#"{"k": 1}"#);
        assert_eq!(load_all(&mut bindings, &first, &mut slots), 1);

        let second = parse(r#"{"other": 1}"#);
        assert_eq!(load_all(&mut bindings, &second, &mut slots), 0);
        assert!(!bindings[0].found());
    }

    #[test]
    fn test_binding_set_counts() {
        let doc = parse(r#"{"a": 1, "b": "x"}"#);
        let mut slots = vec![Value::Empty; 3];
        let mut set = BindingSet::new(vec![
            int_binding("a", 0),
            str_binding("b", 1, 8),
            int_binding("c", 2),
        ]);

        assert_eq!(set.load(&doc, &mut slots), 2);
        assert_eq!(set.found_count(), 2);
        assert!(!set.all_found());
        assert_eq!(set.len(), 3);

        set.reset_all();
        assert_eq!(set.found_count(), 0);
    }
}
