pub mod codec;
pub mod processing;
pub mod session_store;
pub mod text_parser;

pub use codec::{DecodedImage, EncodedImage, ExportFormat};
pub use processing::{GradeSources, PassBase, PassResult, ProcessingService};
pub use session_store::{Commit, InMemorySessionStore, Session, SessionId, SessionStore};
pub use text_parser::{AdjustmentParser, KeywordParser, ParseOutcome};
