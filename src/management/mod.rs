mod session;
mod store;

pub use session::ACCESS_TOKEN_KEY;
pub use session::AUTH_STATE_KEY;
pub use session::CODE_VERIFIER_KEY;
pub use session::SessionManager;
pub use store::FileStore;
pub use store::KeyValueStore;
pub use store::MemoryStore;
