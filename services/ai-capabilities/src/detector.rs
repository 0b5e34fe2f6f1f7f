//! Capability Detector
//!
//! Probes the modern surface, then the legacy one, and normalizes the first
//! usable answer into the availability tri-state.

use docsmith_models::{Availability, CapabilityKind, LanguagePair, SurfaceShape};
use tracing::debug;

use crate::adapter::{adapter_for, CapabilityAdapter};
use crate::environment::CapabilityEnvironment;

#[derive(Debug, Clone)]
pub struct CapabilityDetector {
    environment: CapabilityEnvironment,
}

impl CapabilityDetector {
    pub fn new(environment: CapabilityEnvironment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> &CapabilityEnvironment {
        &self.environment
    }

    /// Adapters for every present surface, in probe order.
    pub fn adapters(&self, kind: CapabilityKind) -> Vec<Box<dyn CapabilityAdapter>> {
        SurfaceShape::PRIORITY
            .iter()
            .filter_map(|shape| {
                self.environment
                    .surface(kind, *shape)
                    .map(|surface| adapter_for(kind, *shape, surface))
            })
            .collect()
    }

    /// First present surface, whether or not it answers availability queries.
    pub fn select(&self, kind: CapabilityKind) -> Option<Box<dyn CapabilityAdapter>> {
        self.adapters(kind).into_iter().next()
    }

    /// Never fails. Probe errors count as "surface absent" and detection moves
    /// on to the next shape, ending at `Unavailable`.
    pub async fn get_availability(
        &self,
        kind: CapabilityKind,
        languages: Option<&LanguagePair>,
    ) -> Availability {
        for adapter in self.adapters(kind) {
            if !adapter.exposes_availability() {
                debug!(capability = %kind, shape = %adapter.shape(), "surface has no availability query");
                continue;
            }

            match adapter.check_availability(languages).await {
                Ok(availability) => {
                    debug!(
                        capability = %kind,
                        shape = %adapter.shape(),
                        availability = %availability,
                        "availability probed"
                    );
                    return availability;
                }
                Err(error) => {
                    debug!(
                        capability = %kind,
                        shape = %adapter.shape(),
                        error = %error,
                        "availability probe failed, treating surface as absent"
                    );
                }
            }
        }

        Availability::Unavailable
    }
}
