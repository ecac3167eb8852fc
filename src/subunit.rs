use crate::callbacks::CallbackSet;
use crate::connection::{Connection, MessageCallback};
use crate::constants::{Avail, SENTINEL_FUNCTION, SUBUNIT_SYS};
use crate::converters::{decode_enum_or_unknown, encode_enum};
use crate::error::Result;
use crate::function::{
    Access, CachedValue, Converter, Descriptor, Function, FunctionFamily, Init,
};
use crate::protocol::Message;
use crate::session::InitializationSession;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Standard "is this subunit present" function
pub static AVAIL: Function<Avail> = Function::new(
    "AVAIL",
    Access::Read,
    Init::Skip,
    Converter::new(decode_enum_or_unknown::<Avail>, encode_enum::<Avail>),
);

/// Callback fired when cached values of a subunit change
pub type UpdateCallback = Arc<dyn Fn() + Send + Sync>;

/// The functions a type of subunit exposes
pub struct SubunitKind {
    pub functions: &'static [&'static dyn Descriptor],
    /// Whether AVAIL must report `Ready` before other values are accepted
    pub requires_avail: bool,
}

/// Lifecycle of a subunit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Initializing,
    Ready,
}

struct State {
    phase: Phase,
    cache: HashMap<String, CachedValue>,
    unsupported: HashSet<String>,
}

pub(crate) struct Inner {
    pub(crate) id: String,
    pub(crate) kind: &'static SubunitKind,
    pub(crate) connection: Arc<Connection>,
    state: Mutex<State>,
    callbacks: CallbackSet<dyn Fn() + Send + Sync>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn descriptor(&self, function: &str) -> Option<&'static dyn Descriptor> {
        if self.kind.requires_avail && function == AVAIL.name {
            return Some(&AVAIL);
        }
        self.kind
            .functions
            .iter()
            .copied()
            .find(|descriptor| descriptor.accepts(function))
    }

    fn available(&self, state: &State) -> bool {
        !self.kind.requires_avail
            || cached::<Avail>(&state.cache, AVAIL.name) == Some(Avail::Ready)
    }

    pub(crate) fn is_available(&self) -> bool {
        self.available(&self.state())
    }

    pub(crate) fn mark_unsupported(&self, function: &str) {
        self.state().unsupported.insert(function.to_string());
    }

    /// Functions to GET once the subunit is known to be available
    pub(crate) fn init_queries(&self) -> Vec<&'static str> {
        let mut queries = Vec::new();
        for query in self.kind.functions.iter().filter_map(|d| d.init_query()) {
            // The sentinel request that closes the burst fetches it anyway
            if self.id == SUBUNIT_SYS && query == SENTINEL_FUNCTION {
                continue;
            }
            if !queries.contains(&query) {
                queries.push(query);
            }
        }
        queries
    }

    /// Steady-state and initialization path for incoming messages
    fn handle_message(&self, message: &Message) {
        // Error markers only matter to a running initialization session
        if !message.is_ok() || message.subunit() != Some(self.id.as_str()) {
            return;
        }
        let Some(function) = message.function() else {
            return;
        };
        let Some(descriptor) = self.descriptor(function) else {
            tracing::trace!("{}: ignoring unknown function {}", self.id, function);
            return;
        };
        let raw = message.value().unwrap_or_default();

        let notify = {
            let mut state = self.state();
            if state.phase == Phase::Created {
                return;
            }
            if function != AVAIL.name && !self.available(&state) {
                tracing::trace!("{}: not available, ignoring {}", self.id, function);
                return;
            }
            let Some(value) = descriptor.decode_cached(raw) else {
                tracing::debug!("{}: cannot decode {}={:?}", self.id, function, raw);
                return;
            };
            state.cache.insert(function.to_string(), value);
            state.phase == Phase::Ready
        };

        if notify {
            self.callbacks.for_each(|callback| callback());
        }
    }
}

fn cached<T: Clone + 'static>(cache: &HashMap<String, CachedValue>, wire_name: &str) -> Option<T> {
    cache
        .get(wire_name)
        .and_then(|value| (**value).downcast_ref::<T>())
        .cloned()
}

/// A logical section of the device, such as a zone, built from function
/// descriptors
///
/// Values are cached as the device reports them. Writing a value only
/// queues the command; the cache follows when the device echoes the change.
pub struct Subunit {
    inner: Arc<Inner>,
    handler: MessageCallback,
}

impl Subunit {
    /// Create a subunit and subscribe it to the connection's messages
    pub fn new(id: impl Into<String>, kind: &'static SubunitKind, connection: Arc<Connection>) -> Self {
        let inner = Arc::new(Inner {
            id: id.into(),
            kind,
            connection,
            state: Mutex::new(State {
                phase: Phase::Created,
                cache: HashMap::new(),
                unsupported: HashSet::new(),
            }),
            callbacks: CallbackSet::new(),
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        let handler: MessageCallback = Arc::new(move |message: &Message| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_message(message);
            }
        });
        inner.connection.register_message_callback(handler.clone());

        Self { inner, handler }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn phase(&self) -> Phase {
        self.inner.state().phase
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.inner.connection
    }

    /// Query the device for everything this subunit supports
    ///
    /// Returns once the device has answered, or fails with
    /// `InitializationFailed` if nothing at all came back. A subunit whose
    /// AVAIL is not `Ready` initializes successfully with every other value
    /// left absent. One update notification fires for a successful,
    /// available initialization.
    pub async fn initialize(&self) -> Result<()> {
        {
            let mut state = self.inner.state();
            if state.phase == Phase::Ready {
                tracing::debug!("{}: already initialized", self.inner.id);
                return Ok(());
            }
            state.phase = Phase::Initializing;
        }

        let available = InitializationSession::new(&self.inner).run().await?;

        self.inner.state().phase = Phase::Ready;
        if available {
            tracing::debug!("{}: initialized", self.inner.id);
            self.inner.callbacks.for_each(|callback| callback());
        } else {
            tracing::debug!("{}: not available on this device", self.inner.id);
        }
        Ok(())
    }

    /// Last value the device reported for `AVAIL`
    pub fn avail(&self) -> Option<Avail> {
        self.get(&AVAIL)
    }

    /// Cached value of a function, `None` if never reported
    pub fn get<T: Clone + Send + Sync + 'static>(&self, function: &Function<T>) -> Option<T> {
        cached(&self.inner.state().cache, function.name)
    }

    /// Send a new value; the cache updates when the device reports it back
    pub fn set<T>(&self, function: &Function<T>, value: &T) -> Result<()> {
        let raw = function.encode(value)?;
        self.inner.connection.put(&self.inner.id, function.name, &raw)
    }

    /// Write a raw value to a function, for commands that have no cached state
    pub fn put(&self, function: &str, value: &str) -> Result<()> {
        self.inner.connection.put(&self.inner.id, function, value)
    }

    /// Cached value of one member of a family
    pub fn get_indexed<T: Clone + Send + Sync + 'static>(
        &self,
        family: &FunctionFamily<T>,
        key: &str,
    ) -> Option<T> {
        cached(&self.inner.state().cache, &family.wire_name(key))
    }

    /// All members of a family the device reported, by key
    pub fn entries<T: Clone + Send + Sync + 'static>(
        &self,
        family: &FunctionFamily<T>,
    ) -> BTreeMap<String, T> {
        let state = self.inner.state();
        state
            .cache
            .iter()
            .filter_map(|(function, value)| {
                let key = family.key(function)?;
                let value = (**value).downcast_ref::<T>()?;
                Some((key.to_string(), value.clone()))
            })
            .collect()
    }

    /// Whether the device answered a query for `function` with an error
    /// during initialization
    pub fn is_unsupported(&self, function: &str) -> bool {
        self.inner.state().unsupported.contains(function)
    }

    pub fn register_update_callback(&self, callback: UpdateCallback) {
        self.inner.callbacks.insert(callback);
    }

    pub fn unregister_update_callback(&self, callback: &UpdateCallback) {
        self.inner.callbacks.remove(callback);
    }

    #[cfg(test)]
    pub(crate) fn init_queries(&self) -> Vec<&'static str> {
        self.inner.init_queries()
    }
}

impl Drop for Subunit {
    fn drop(&mut self) {
        self.inner
            .connection
            .unregister_message_callback(&self.handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::{decode_int, decode_str, encode_int, encode_str};
    use crate::function::numeric_key;

    static LEVEL: Function<i32> = Function::new(
        "LEVEL",
        Access::ReadWrite,
        Init::Group("BASIC"),
        Converter::new(decode_int, encode_int),
    );

    static LABEL: Function<String> = Function::new(
        "LABEL",
        Access::ReadWrite,
        Init::Own,
        Converter::new(decode_str, encode_str),
    );

    static SLOT: FunctionFamily<String> = FunctionFamily::new(
        "SLOT",
        "NAME",
        Init::Group("SLOTNAME"),
        numeric_key,
        Converter::new(decode_str, encode_str),
    );

    static KIND: SubunitKind = SubunitKind {
        functions: &[&LEVEL, &LABEL, &SLOT],
        requires_avail: true,
    };

    fn subunit() -> Subunit {
        Subunit::new("TEST", &KIND, Arc::new(Connection::new("test")))
    }

    fn set_phase(subunit: &Subunit, phase: Phase) {
        subunit.inner.state().phase = phase;
    }

    #[test]
    fn construction_subscribes_and_drop_unsubscribes() {
        let connection = Arc::new(Connection::new("test"));
        let subunit = Subunit::new("TEST", &KIND, connection.clone());
        assert_eq!(connection.callback_count(), 1);
        drop(subunit);
        assert_eq!(connection.callback_count(), 0);
    }

    #[test]
    fn init_queries_are_deduplicated() {
        assert_eq!(subunit().inner.init_queries(), vec!["BASIC", "LABEL", "SLOTNAME"]);
    }

    #[test]
    fn reports_before_initialize_are_ignored() {
        let subunit = subunit();
        subunit.inner.handle_message(&Message::report("TEST", "AVAIL", "Ready"));
        subunit.inner.handle_message(&Message::report("TEST", "LEVEL", "3"));
        assert_eq!(subunit.avail(), None);
        assert_eq!(subunit.get(&LEVEL), None);
    }

    #[test]
    fn values_need_avail_ready() {
        let subunit = subunit();
        set_phase(&subunit, Phase::Ready);

        subunit.inner.handle_message(&Message::report("TEST", "LEVEL", "3"));
        assert_eq!(subunit.get(&LEVEL), None);

        subunit.inner.handle_message(&Message::report("TEST", "AVAIL", "Not Ready"));
        subunit.inner.handle_message(&Message::report("TEST", "LEVEL", "3"));
        assert_eq!(subunit.avail(), Some(Avail::NotReady));
        assert_eq!(subunit.get(&LEVEL), None);

        subunit.inner.handle_message(&Message::report("TEST", "AVAIL", "Ready"));
        subunit.inner.handle_message(&Message::report("TEST", "LEVEL", "3"));
        assert_eq!(subunit.get(&LEVEL), Some(3));
    }

    #[test]
    fn steady_state_updates_notify_per_message() {
        let subunit = subunit();
        set_phase(&subunit, Phase::Ready);
        subunit.inner.handle_message(&Message::report("TEST", "AVAIL", "Ready"));

        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = count.clone();
        subunit.register_update_callback(Arc::new(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }));

        subunit.inner.handle_message(&Message::report("TEST", "LEVEL", "3"));
        subunit.inner.handle_message(&Message::report("TEST", "LEVEL", "3"));
        // Undecodable, unknown, foreign and error messages are dropped
        subunit.inner.handle_message(&Message::report("TEST", "LEVEL", "loud"));
        subunit.inner.handle_message(&Message::report("TEST", "BOGUS", "1"));
        subunit.inner.handle_message(&Message::report("OTHER", "LEVEL", "4"));
        subunit.inner.handle_message(&Message::error(crate::protocol::Status::Undefined, None));

        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(subunit.get(&LEVEL), Some(3));
    }

    #[test]
    fn family_entries_reflect_reports_only() {
        let subunit = subunit();
        set_phase(&subunit, Phase::Ready);
        subunit.inner.handle_message(&Message::report("TEST", "AVAIL", "Ready"));
        subunit.inner.handle_message(&Message::report("TEST", "SLOT2NAME", "Two"));
        subunit.inner.handle_message(&Message::report("TEST", "SLOT7NAME", "Seven"));

        let entries = subunit.entries(&SLOT);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get("2").map(String::as_str), Some("Two"));
        assert_eq!(subunit.get_indexed(&SLOT, "7"), Some("Seven".to_string()));
        assert_eq!(subunit.get_indexed(&SLOT, "1"), None);
    }

    #[test]
    fn set_without_link_fails_and_leaves_cache() {
        let subunit = subunit();
        assert!(subunit.set(&LEVEL, &5).is_err());
        assert_eq!(subunit.get(&LEVEL), None);
    }
}
