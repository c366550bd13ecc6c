use std::fmt;

use serde::Serialize;

/// Aggregate statistics produced by a generation run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CodegenStats {
    /// Final and undecorated module groups.
    pub modules: usize,
    /// Raw groups emitted for decorated modules.
    pub raw_modules: usize,
    /// Generated declarations across all final groups, remote callers included.
    pub types: usize,
    pub remote_callers: usize,
    /// Vertices of the final dependency graph.
    pub vertices: usize,
    /// Distinct ordered pairs linked in the final dependency graph.
    pub edges: usize,
    pub factory_entries: usize,
    /// Types whose generation failed.
    pub failures: usize,
}

/// Cargo-style summary: one headline, then indented detail lines. A failure
/// line is appended only when something failed.
impl fmt::Display for CodegenStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Generated {} types in {} modules ({} raw)",
            self.types, self.modules, self.raw_modules
        )?;
        writeln!(
            f,
            "  {} remote callers, {} factory entries",
            self.remote_callers, self.factory_entries,
        )?;
        write!(
            f,
            "  Dependency graph: {} vertices, {} edges",
            self.vertices, self.edges,
        )?;
        if self.failures > 0 {
            write!(f, "\n  {} types failed to generate", self.failures)?;
        }
        Ok(())
    }
}
