//! Output - Deferred values produced by the engine
//!
//! An `Output<T>` is a handle to a value that only becomes known once the
//! resource producing it has been materialized. Stack definitions pass outputs
//! into other descriptors and derive new outputs with `apply`/`all`/`zip`.
//! Nothing here ever blocks: observing an output is a non-blocking peek that
//! may report `Pending`.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::UpstreamResolutionError;
use crate::resource::ResourceId;

/// Current state of a deferred value
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Not known yet
    Pending,
    /// Known
    Ready(T),
    /// The producing resource (or a derivation step) failed
    Failed(UpstreamResolutionError),
}

impl<T> Resolution<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Resolution::Pending)
    }

    /// Returns the value if it is known
    pub fn ready(self) -> Option<T> {
        match self {
            Resolution::Ready(v) => Some(v),
            _ => None,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

trait Source<T>: Send + Sync {
    fn poll(&self) -> Resolution<T>;
}

/// Leaf value set once by a `Resolver`
struct Cell<T> {
    state: Mutex<Resolution<T>>,
}

impl<T: Clone + Send> Source<T> for Cell<T> {
    fn poll(&self) -> Resolution<T> {
        lock(&self.state).clone()
    }
}

type Transform<A, T> = Box<dyn FnOnce(A) -> Result<T, String> + Send>;

enum Stage<A, T> {
    Waiting(Transform<A, T>),
    Settled(Resolution<T>),
}

/// Output derived from another output by a pure function
struct Mapped<A, T> {
    input: Output<A>,
    stage: Mutex<Option<Stage<A, T>>>,
}

impl<A, T> Source<T> for Mapped<A, T>
where
    A: Clone + Send + Sync + 'static,
    T: Clone + Send + 'static,
{
    fn poll(&self) -> Resolution<T> {
        let mut stage = lock(&self.stage);
        let (next, result) = match stage.take() {
            Some(Stage::Settled(settled)) => (Stage::Settled(settled.clone()), settled),
            Some(Stage::Waiting(f)) => match self.input.resolution() {
                Resolution::Pending => (Stage::Waiting(f), Resolution::Pending),
                Resolution::Failed(e) => {
                    let failed = Resolution::Failed(e);
                    (Stage::Settled(failed.clone()), failed)
                }
                Resolution::Ready(value) => {
                    let settled = match f(value) {
                        Ok(v) => Resolution::Ready(v),
                        Err(reason) => Resolution::Failed(UpstreamResolutionError::new(
                            describe_origin(self.input.dependencies()),
                            reason,
                        )),
                    };
                    (Stage::Settled(settled.clone()), settled)
                }
            },
            // Only reachable if a previous poll panicked inside the transform
            None => {
                let failed = Resolution::Failed(UpstreamResolutionError::new(
                    describe_origin(self.input.dependencies()),
                    "derivation panicked",
                ));
                (Stage::Settled(failed.clone()), failed)
            }
        };
        *stage = Some(next);
        result
    }
}

/// Output that is ready once every input is ready
struct Joined<T> {
    inputs: Vec<Output<T>>,
}

impl<T: Clone + Send + Sync + 'static> Source<Vec<T>> for Joined<T> {
    fn poll(&self) -> Resolution<Vec<T>> {
        let mut values = Vec::with_capacity(self.inputs.len());
        let mut pending = false;
        for input in &self.inputs {
            match input.resolution() {
                Resolution::Ready(v) => values.push(v),
                Resolution::Pending => pending = true,
                Resolution::Failed(e) => return Resolution::Failed(e),
            }
        }
        if pending {
            Resolution::Pending
        } else {
            Resolution::Ready(values)
        }
    }
}

struct Zipped<A, B> {
    left: Output<A>,
    right: Output<B>,
}

impl<A, B> Source<(A, B)> for Zipped<A, B>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    fn poll(&self) -> Resolution<(A, B)> {
        match (self.left.resolution(), self.right.resolution()) {
            (Resolution::Failed(e), _) | (_, Resolution::Failed(e)) => Resolution::Failed(e),
            (Resolution::Ready(a), Resolution::Ready(b)) => Resolution::Ready((a, b)),
            _ => Resolution::Pending,
        }
    }
}

fn describe_origin(deps: &BTreeSet<ResourceId>) -> String {
    if deps.is_empty() {
        "<derived>".to_string()
    } else {
        deps.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Handle to a deferred value
pub struct Output<T> {
    source: Arc<dyn Source<T>>,
    dependencies: Arc<BTreeSet<ResourceId>>,
    secret: bool,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            dependencies: Arc::clone(&self.dependencies),
            secret: self.secret,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Output<T> {
    /// An output whose value is already known
    pub fn known(value: T) -> Self {
        Self {
            source: Arc::new(Cell {
                state: Mutex::new(Resolution::Ready(value)),
            }),
            dependencies: Arc::new(BTreeSet::new()),
            secret: false,
        }
    }

    /// A pending output produced by `origin`, together with the resolver that settles it
    pub fn unresolved(origin: ResourceId) -> (Self, Resolver<T>) {
        let cell = Arc::new(Cell {
            state: Mutex::new(Resolution::Pending),
        });
        let output = Self {
            source: cell.clone(),
            dependencies: Arc::new(BTreeSet::from([origin.clone()])),
            secret: false,
        };
        (output, Resolver { cell, origin })
    }

    /// Derive a new output; `f` runs at most once, after this output resolves
    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.try_apply(move |v| Ok(f(v)))
    }

    /// Like `apply`, but the derivation may reject the resolved value
    pub fn try_apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U, String> + Send + 'static,
    {
        Output {
            source: Arc::new(Mapped {
                input: self.clone(),
                stage: Mutex::new(Some(Stage::Waiting(Box::new(f)))),
            }),
            dependencies: Arc::clone(&self.dependencies),
            secret: self.secret,
        }
    }

    /// Combine outputs of the same type; ready once all inputs are ready
    pub fn all(outputs: impl IntoIterator<Item = Output<T>>) -> Output<Vec<T>> {
        let inputs: Vec<Output<T>> = outputs.into_iter().collect();
        let dependencies = inputs
            .iter()
            .flat_map(|o| o.dependencies.iter().cloned())
            .collect();
        let secret = inputs.iter().any(|o| o.secret);
        Output {
            source: Arc::new(Joined { inputs }),
            dependencies: Arc::new(dependencies),
            secret,
        }
    }

    /// Combine two outputs of different types
    pub fn zip<B>(&self, other: &Output<B>) -> Output<(T, B)>
    where
        B: Clone + Send + Sync + 'static,
    {
        let dependencies = self
            .dependencies
            .union(&other.dependencies)
            .cloned()
            .collect();
        Output {
            source: Arc::new(Zipped {
                left: self.clone(),
                right: other.clone(),
            }),
            dependencies: Arc::new(dependencies),
            secret: self.secret || other.secret,
        }
    }

    /// Non-blocking peek at the current state
    pub fn resolution(&self) -> Resolution<T> {
        self.source.poll()
    }
}

impl<T> Output<T> {
    /// Mark this output as secret; derived outputs stay secret
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Resources this output (transitively) comes from
    pub fn dependencies(&self) -> &BTreeSet<ResourceId> {
        &self.dependencies
    }

    /// Whether both handles point at the same deferred value
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

impl<T> PartialEq for Output<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) && self.secret == other.secret
    }
}

impl<T: fmt::Debug + Clone + Send + Sync + 'static> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secret {
            return write!(f, "Output([secret])");
        }
        match self.resolution() {
            Resolution::Pending => write!(f, "Output(<pending>)"),
            Resolution::Ready(v) => write!(f, "Output({:?})", v),
            Resolution::Failed(e) => write!(f, "Output(<failed: {}>)", e),
        }
    }
}

impl<T: fmt::Display + Clone + Send + Sync + 'static> fmt::Display for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secret {
            return write!(f, "[secret]");
        }
        match self.resolution() {
            Resolution::Pending => write!(f, "(known after apply)"),
            Resolution::Ready(v) => write!(f, "{}", v),
            Resolution::Failed(e) => write!(f, "(failed: {})", e),
        }
    }
}

/// Producer side of an unresolved output
pub struct Resolver<T> {
    cell: Arc<Cell<T>>,
    origin: ResourceId,
}

impl<T> Resolver<T> {
    /// Settle the output with a value. Returns false if it was already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Resolution::Ready(value))
    }

    /// Settle the output as failed. Returns false if it was already settled.
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        let error = UpstreamResolutionError::new(self.origin.to_string(), reason);
        self.settle(Resolution::Failed(error))
    }

    fn settle(&self, resolution: Resolution<T>) -> bool {
        let mut state = lock(&self.cell.state);
        if state.is_pending() {
            *state = resolution;
            true
        } else {
            false
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("origin", &self.origin)
            .finish()
    }
}
