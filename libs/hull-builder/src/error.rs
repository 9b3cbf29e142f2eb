//! Error types for hull topology validation.

use thiserror::Error;

/// A broken structural invariant of a half-edge polyhedron.
///
/// Indices are plain slot indices so the same error describes both the
/// construction mesh and the compacted runtime hull.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A half-edge without an opposite.
    #[error("Half-edge {edge} has no twin")]
    MissingTwin {
        /// Slot of the half-edge.
        edge: usize,
    },

    /// `twin(twin(e)) != e`.
    #[error("Twin of half-edge {edge} does not point back to it")]
    TwinMismatch {
        /// Slot of the half-edge whose twin points elsewhere.
        edge: usize,
    },

    /// The twin runs between different vertices.
    #[error("Half-edge {edge} and its twin do not share endpoints")]
    TwinEndpoints {
        /// Slot of the half-edge.
        edge: usize,
    },

    /// Following `next` never returns to the face edge.
    #[error("Boundary loop of face {face} does not close")]
    OpenLoop {
        /// Slot of the face.
        face: usize,
    },

    /// A loop edge names a different face.
    #[error("Half-edge {edge} is in the loop of face {face} but belongs to another face")]
    FaceMismatch {
        /// Slot of the misplaced half-edge.
        edge: usize,
        /// Slot of the face whose loop reached it.
        face: usize,
    },

    /// A face with fewer than three edges.
    #[error("Face {face} has only {edges} edges")]
    DegenerateFace {
        /// Slot of the face.
        face: usize,
        /// Number of edges in its loop.
        edges: usize,
    },

    /// A reference past the live element range.
    #[error("Invalid {kind} reference: {index}")]
    IndexOutOfRange {
        /// Element kind: `"vertex"`, `"half-edge"` or `"face"`.
        kind: &'static str,
        /// Offending slot index.
        index: usize,
    },
}

/// Result type for topology validation
pub type TopologyResult<T> = Result<T, TopologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_element() {
        let err = TopologyError::FaceMismatch { edge: 3, face: 1 };
        assert_eq!(
            err.to_string(),
            "Half-edge 3 is in the loop of face 1 but belongs to another face"
        );
        let err = TopologyError::IndexOutOfRange {
            kind: "vertex",
            index: 70,
        };
        assert_eq!(err.to_string(), "Invalid vertex reference: 70");
    }

    #[test]
    fn test_fields_are_reported() {
        let err = TopologyError::DegenerateFace { face: 4, edges: 2 };
        assert_eq!(err.to_string(), "Face 4 has only 2 edges");
        let TopologyError::DegenerateFace { face, edges } = err else {
            unreachable!();
        };
        assert_eq!((face, edges), (4, 2));
    }
}
