//! Live voice-interview sessions: the session store, optional realtime-voice
//! signing, and the HTTP handlers that drive a session from start to finish.

pub mod handlers;
pub mod realtime;
pub mod session;
