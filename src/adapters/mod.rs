// Adapters layer: concrete implementations of the domain ports against
// external systems (Gemini HTTP API, local filesystem persistence).

pub mod gemini;
pub mod store;
