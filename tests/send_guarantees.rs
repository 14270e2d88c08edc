//! Compile-time guards on the orchestrator's thread-safety surface.
use softfall::{ManualClock, Orchestrator, Settings, SystemClock};
use static_assertions::{assert_impl_all, assert_not_impl_any};

assert_impl_all!(Orchestrator: Send);
assert_not_impl_any!(Orchestrator: Clone);
assert_impl_all!(ManualClock: Clone, Send, Sync);
assert_impl_all!(SystemClock: Send, Sync);
assert_impl_all!(Settings: Clone, Send, Sync);
