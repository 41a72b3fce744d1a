use thiserror::Error;

/// Top-level error type for hull construction.
#[derive(Debug, Error, PartialEq)]
pub enum HullError {
    #[error("degenerate input: {0}")]
    DegenerateInput(#[from] DegenerateInput),

    #[error("hull expansion did not converge after {iterations} iterations")]
    ConvergenceFailure { iterations: usize },

    /// An internal invariant was violated. This is a bug, not bad input.
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl HullError {
    /// Returns `true` if the input simply has no volume to wrap.
    ///
    /// Consumers treat this case as "no geometry" rather than a failure.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateInput(_))
    }
}

/// Reasons an input point set cannot seed a tetrahedron.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DegenerateInput {
    #[error("{count} points given, at least 4 are required")]
    TooFewPoints { count: usize },

    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("all points are coincident")]
    Coincident,

    #[error("all points are collinear")]
    Collinear,

    #[error("all points are coplanar")]
    Coplanar,
}

/// Errors related to the working polyhedron's topology.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("visible region seen from point {apex} is not simply connected")]
    HorizonNotSimple { apex: usize },

    #[error("no horizon found around point {apex}")]
    OpenBoundary { apex: usize },

    #[error("edge ({a}, {b}) is shared by {faces} faces")]
    NonManifoldEdge { a: usize, b: usize, faces: usize },

    #[error("face not found in the working set")]
    MissingFace,

    #[error("face boundary does not form a closed loop")]
    BrokenLoop,

    #[error("edge list has {found} edges, faces define {expected}")]
    EdgeListMismatch { expected: usize, found: usize },

    #[error("V - E + F = {vertices} - {edges} + {faces} is not 2")]
    NotClosed {
        vertices: usize,
        edges: usize,
        faces: usize,
    },
}

/// Convenience type alias for results using [`HullError`].
pub type Result<T> = std::result::Result<T, HullError>;
