use facet::Facet;

use crate::info::payload_type_name;
use crate::{DebugInfoKind, DebugInfoStack};

/// Diagnostic view of a debug info stack, innermost frame first.
///
/// Meant for logs and dumps only; nothing turns it back into a stack.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct StackDump {
    pub frames: Vec<FrameDump>,
}

#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct FrameDump {
    pub kind: DebugInfoKind,
    /// Concrete payload type.
    pub type_name: String,
    /// `Debug` rendering of the payload.
    pub debug: String,
}

impl StackDump {
    pub fn to_json(&self) -> Result<String, String> {
        facet_json::to_string(self).map_err(|e| e.to_string())
    }
}

impl DebugInfoStack {
    pub fn dump(&self) -> StackDump {
        StackDump {
            frames: self
                .iter()
                .map(|(kind, info)| FrameDump {
                    kind,
                    type_name: payload_type_name(info).to_owned(),
                    debug: format!("{info:?}"),
                })
                .collect(),
        }
    }
}
