use facet::Facet;
use std::fmt;

/// Semantic category of a debug info payload.
///
/// A stack holds at most one *visible* payload per kind: lookups return the
/// innermost frame of the requested kind.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum DebugInfoKind {
    /// Producer metadata (model id, request origin, ...).
    ProducerInfo,
    /// Flags for the mobile runtime.
    MobileRuntimeInfo,
    /// Profiler state shared with operator observers.
    ProfilerState,

    /// Reserved for tests.
    TestInfo,
    /// Reserved for tests.
    TestInfo2,
}

impl DebugInfoKind {
    pub const ALL: [DebugInfoKind; 5] = [
        Self::ProducerInfo,
        Self::MobileRuntimeInfo,
        Self::ProfilerState,
        Self::TestInfo,
        Self::TestInfo2,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProducerInfo => "PRODUCER_INFO",
            Self::MobileRuntimeInfo => "MOBILE_RUNTIME_INFO",
            Self::ProfilerState => "PROFILER_STATE",
            Self::TestInfo => "TEST_INFO",
            Self::TestInfo2 => "TEST_INFO_2",
        }
    }
}

impl fmt::Display for DebugInfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
