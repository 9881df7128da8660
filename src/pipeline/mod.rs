// Response pipeline - shortcut matching, backend dispatch, translation and cleanup

pub mod backends;
pub mod normalizer;
pub mod router;
pub mod translator;
pub mod types;

pub use backends::{Backend, BackendError, Backends};
pub use normalizer::TextNormalizer;
pub use router::{Router, RouterError};
pub use translator::{LanguageNormalizer, TranslationService, TranslatorError};
pub use types::*;
