//! Build lifecycle observers.
//!
//! Observers run synchronously in registration order. The first observer
//! that fails stops the remaining ones for that trigger and its error is
//! returned to the caller.

use std::fmt;
use std::sync::Arc;

use bundlekit_config::ResolvedConfig;

use crate::error::{Error, HookError, HookEvent, Result};
use crate::size::BundleSize;

type Observer<T> = Box<dyn Fn(&T) -> std::result::Result<(), HookError> + Send + Sync>;
type CompletionObserver =
    Box<dyn for<'a> Fn(&BuildCompletion<'a>) -> std::result::Result<(), HookError> + Send + Sync>;

/// Payload of the build-complete hooks.
#[derive(Debug)]
pub struct BuildCompletion<'a> {
    pub success: bool,
    /// Config the build ran with.
    pub config: &'a Arc<ResolvedConfig>,
    pub duration_ms: f64,
    /// Present on success.
    pub size: Option<&'a BundleSize>,
    /// Present on failure.
    pub error: Option<&'a Error>,
}

/// Three ordered observer lists: error, build-start and build-complete.
///
/// Owned by a [`Context`](crate::Context); tests build a fresh one rather
/// than sharing global state.
///
/// # Examples
///
/// ```
/// use bundlekit::{HookEvent, HookRegistry};
///
/// let mut hooks = HookRegistry::new();
/// hooks
///     .on_build_start(|config| {
///         println!("building {}", config.env());
///         Ok(())
///     })
///     .on_error(|err| {
///         eprintln!("build failed: {err}");
///         Ok(())
///     });
///
/// assert_eq!(hooks.len(HookEvent::BuildStart), 1);
/// assert_eq!(hooks.len(HookEvent::BuildComplete), 0);
/// ```
#[derive(Default)]
pub struct HookRegistry {
    error: Vec<Observer<Error>>,
    build_start: Vec<Observer<ResolvedConfig>>,
    build_complete: Vec<CompletionObserver>,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("error", &self.error.len())
            .field("build_start", &self.build_start.len())
            .field("build_complete", &self.build_complete.len())
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe bundler failures, before the build-complete hooks run.
    ///
    /// # Arguments
    ///
    /// * `hook` - Called with the bundler's error; an `Err` replaces it
    pub fn on_error<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&Error) -> std::result::Result<(), HookError> + Send + Sync + 'static,
    {
        self.error.push(Box::new(hook));
        self
    }

    /// Observe the start of each build with its resolved config.
    ///
    /// # Arguments
    ///
    /// * `hook` - Called before the bundler runs; an `Err` aborts the build
    pub fn on_build_start<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&ResolvedConfig) -> std::result::Result<(), HookError> + Send + Sync + 'static,
    {
        self.build_start.push(Box::new(hook));
        self
    }

    /// Observe the end of every build, successful or not.
    pub fn on_build_complete<F>(&mut self, hook: F) -> &mut Self
    where
        F: for<'a> Fn(&BuildCompletion<'a>) -> std::result::Result<(), HookError>
            + Send
            + Sync
            + 'static,
    {
        self.build_complete.push(Box::new(hook));
        self
    }

    /// Number of observers registered for `event`.
    pub fn len(&self, event: HookEvent) -> usize {
        match event {
            HookEvent::Error => self.error.len(),
            HookEvent::BuildStart => self.build_start.len(),
            HookEvent::BuildComplete => self.build_complete.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_empty() && self.build_start.is_empty() && self.build_complete.is_empty()
    }

    /// Run the error observers in order.
    ///
    /// # Errors
    ///
    /// [`Error::Hook`] from the first observer that fails; later observers
    /// are skipped.
    pub fn trigger_error(&self, error: &Error) -> Result<()> {
        dispatch(HookEvent::Error, &self.error, error)
    }

    pub fn trigger_build_start(&self, config: &ResolvedConfig) -> Result<()> {
        dispatch(HookEvent::BuildStart, &self.build_start, config)
    }

    pub fn trigger_build_complete(&self, completion: &BuildCompletion<'_>) -> Result<()> {
        tracing::debug!(
            event = %HookEvent::BuildComplete,
            observers = self.build_complete.len(),
            "dispatching"
        );
        for hook in &self.build_complete {
            hook(completion).map_err(|source| Error::Hook {
                event: HookEvent::BuildComplete,
                source,
            })?;
        }
        Ok(())
    }
}

fn dispatch<T>(event: HookEvent, observers: &[Observer<T>], payload: &T) -> Result<()> {
    tracing::debug!(event = %event, observers = observers.len(), "dispatching");
    for hook in observers {
        hook(payload).map_err(|source| Error::Hook { event, source })?;
    }
    Ok(())
}
