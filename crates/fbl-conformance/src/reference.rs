#![forbid(unsafe_code)]

use crate::HarnessError;
use fbl_status::StatusCode;

/// The trusted library results are checked against.
///
/// A tester acquires the engine once when it is built and releases it when it goes away.
pub trait ReferenceEngine {
    fn name(&self) -> &str;

    fn setup(&mut self) -> Result<(), StatusCode>;

    fn teardown(&mut self);
}

/// Holds a set-up reference engine and tears it down on drop.
pub struct ReferenceSession {
    engine: Box<dyn ReferenceEngine>,
}

impl ReferenceSession {
    pub fn acquire(mut engine: Box<dyn ReferenceEngine>) -> Result<Self, HarnessError> {
        engine
            .setup()
            .map_err(|status| HarnessError::ReferenceSetup {
                engine: engine.name().to_string(),
                status,
            })?;
        Ok(Self { engine })
    }

    #[must_use]
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }
}

impl Drop for ReferenceSession {
    fn drop(&mut self) {
        self.engine.teardown();
    }
}

impl std::fmt::Debug for ReferenceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceSession")
            .field("engine", &self.engine.name())
            .finish()
    }
}

/// Reference engine computed on the host; nothing to set up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostReference;

impl ReferenceEngine for HostReference {
    fn name(&self) -> &str {
        "host"
    }

    fn setup(&mut self) -> Result<(), StatusCode> {
        Ok(())
    }

    fn teardown(&mut self) {}
}
