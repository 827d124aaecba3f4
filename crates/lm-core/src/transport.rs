//! Vehicle traction modes handled by the motion engine.

/// Which network a logical train runs on.
///
/// `Rail` and `Road` share the accumulator and ring; they differ in the
/// boundary transition (road runs the full lookahead planner, rail the
/// reduced variant) and in how conflicts are resolved (rail by physical
/// collision, road by lane occupancy).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransportMode {
    #[default]
    Rail,
    Road,
}

impl TransportMode {
    #[inline]
    pub fn is_road(self) -> bool {
        matches!(self, TransportMode::Road)
    }
}

/// Road object class.  Trams share the road planner but never overtake.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadKind {
    #[default]
    Road,
    Tram,
}
