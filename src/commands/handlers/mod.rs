pub(super) mod conversations;
pub(super) mod core;
pub(super) mod session;
pub(super) mod tools;
