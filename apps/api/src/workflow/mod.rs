// Session workflow: the five-screen state machine, its per-session store,
// and the HTTP handlers that drive it.

pub mod handlers;
pub mod state;
pub mod store;
