//! Game Events
//!
//! The observable output of every tick. The event stream is part of the
//! determinism contract: two replays of the same game must produce
//! identical streams, and the serialized names are shared with client
//! implementations.

use serde::{Deserialize, Serialize};

use crate::game::state::BallKind;

/// Which goal a ball fell into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalSide {
    /// The `(0, 0)` corner.
    Left,
    /// The `(FIELD, 0)` corner.
    Right,
}

/// Event payload, tagged with the shared cross-implementation names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TickEventData {
    /// A ball entered the field.
    Spawn {
        /// Ball id.
        id: u32,
        /// Kind rolled at spawn.
        kind: BallKind,
        /// Spawn position.
        x: f64,
        /// Spawn position.
        y: f64,
    },
    /// A normal ball decayed to zero and died.
    Timeout {
        /// Ball id.
        id: u32,
    },
    /// A ball bounced off the bumper.
    BumperHit {
        /// Ball id.
        id: u32,
    },
    /// A normal ball was recharged to full value by the center disc.
    Recharge {
        /// Ball id.
        id: u32,
    },
    /// A ball scored in a goal.
    Goal {
        /// Ball id.
        id: u32,
        /// Which goal.
        side: GoalSide,
        /// Amount credited.
        prize: u64,
    },
    /// A ball was collected by an explosive chain.
    Exploded {
        /// Victim ball id.
        id: u32,
        /// Amount credited for the victim.
        prize: u64,
    },
    /// Two balls collided and one died.
    Collision {
        /// Surviving ball id.
        winner: u32,
        /// Dead ball id.
        loser: u32,
        /// Amount credited.
        prize: u64,
    },
    /// The timeout streak hit the limit; progressive fell back to 1.
    ProgressiveReset,
    /// A leftover special ball was scored because no normal balls
    /// remained.
    AutoCollect {
        /// Ball id.
        id: u32,
        /// Amount credited.
        prize: u64,
    },
    /// Every ball spawned and left the field.
    GameEnd {
        /// Final winnings.
        total_win: u64,
    },
}

/// A tick-stamped event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    /// Tick the event occurred on.
    pub tick: u64,
    /// Event payload.
    #[serde(flatten)]
    pub data: TickEventData,
}

impl TickEvent {
    /// Create a new event.
    pub fn new(tick: u64, data: TickEventData) -> Self {
        Self { tick, data }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tag_names() {
        // The serialized tags are shared with client implementations.
        let goal = TickEvent::new(
            12,
            TickEventData::Goal {
                id: 3,
                side: GoalSide::Left,
                prize: 9,
            },
        );
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["type"], "goal");
        assert_eq!(json["side"], "left");
        assert_eq!(json["tick"], 12);

        let reset = TickEvent::new(99, TickEventData::ProgressiveReset);
        assert_eq!(
            serde_json::to_value(&reset).unwrap()["type"],
            "progressiveReset"
        );

        let hit = TickEvent::new(5, TickEventData::BumperHit { id: 0 });
        assert_eq!(serde_json::to_value(&hit).unwrap()["type"], "bumperHit");

        let end = TickEvent::new(400, TickEventData::GameEnd { total_win: 27 });
        let end_json = serde_json::to_value(&end).unwrap();
        assert_eq!(end_json["type"], "gameEnd");
        assert_eq!(end_json["totalWin"], 27);
    }

    #[test]
    fn test_event_roundtrip() {
        let event = TickEvent::new(
            60,
            TickEventData::Spawn {
                id: 0,
                kind: BallKind::Golden,
                x: 4.2,
                y: 8.7,
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: TickEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
