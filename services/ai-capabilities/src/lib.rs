//! On-device AI capabilities
//!
//! Capability negotiation over two differently-shaped model surfaces
//! (modern and legacy) for summarization and translation. Callers use the
//! [`LocalSummarizer`] and [`LocalTranslator`] facades; surfaces are injected
//! through a [`CapabilityEnvironment`].

pub mod adapter;
pub mod detector;
pub mod environment;
pub mod error;
pub mod negotiator;
pub mod ollama;
pub mod progress;
pub mod summarizer;
pub mod surface;
pub mod translator;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use adapter::{CapabilityAdapter, LegacyCapabilityAdapter, ModernCapabilityAdapter};
pub use detector::CapabilityDetector;
pub use environment::{CapabilityEnvironment, SurfaceSlots};
pub use error::{CapabilityError, CapabilityResult};
pub use negotiator::{coerce_output, SessionNegotiator, SessionOutcome};
pub use ollama::OllamaSurface;
pub use progress::{ProgressCallback, ProgressSubscription, ProgressTracker};
pub use summarizer::LocalSummarizer;
pub use surface::{EventHandler, EventTarget, FeatureSurface, ModelInstance, DOWNLOAD_PROGRESS_EVENT};
pub use translator::{LocalTranslator, TranslateArg};
