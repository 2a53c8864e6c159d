use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for log ingestion and model queries.
///
/// A `Format` error rejects the whole load: a corrupted record could
/// silently desynchronize trajectory continuity for every later frame, so
/// the parser never returns a partially populated model.
#[derive(Debug, Error)]
pub enum Error {
    /// Structurally invalid log line: bad field count or type, a
    /// non-finite number, an unknown record tag, or a broken producer
    /// contract (e.g. a per-particle time regression).
    #[error("malformed log line {line}: {reason}: `{content}`")]
    Format {
        /// 1-based physical line number in the log.
        line: usize,
        /// The offending line, surrounding whitespace trimmed.
        content: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Trajectory query for a particle id that never appeared in the log.
    #[error("unknown particle id {0}")]
    UnknownParticle(u32),

    /// Frame index outside the loaded timeline.
    #[error("frame index {index} out of range ({frames} frames)")]
    FrameOutOfRange {
        /// Requested frame index.
        index: usize,
        /// Number of frames actually loaded.
        frames: usize,
    },

    /// Propagated I/O errors from opening or reading the log file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_names_the_line() {
        let e = Error::Format {
            line: 12,
            content: "0.5,TELEPORT,1".to_string(),
            reason: "unknown record tag `TELEPORT`".to_string(),
        };
        let msg = format!("{e}");
        assert!(msg.contains("line 12"));
        assert!(msg.contains("TELEPORT"));
    }

    #[test]
    fn range_error_reports_bounds() {
        let e = Error::FrameOutOfRange {
            index: 7,
            frames: 3,
        };
        let msg = format!("{e}");
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn result_type_alias_compiles() -> Result<()> {
        Ok(())
    }
}
