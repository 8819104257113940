/// Grounding state of a chain, used by the gait layer so two cooperating limbs never
/// lift at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnchorState {
    /// Must not move.
    Locked,
    /// Mid-step; cannot be locked by its partner's request.
    Moving,
    /// Grounded and idle: may be locked or moved.
    #[default]
    Free,
}

impl AnchorState {
    pub fn can_move(self) -> bool {
        self != AnchorState::Locked
    }

    /// Starts a step on `self` and locks `partner`.
    ///
    /// A locked chain only gets going once its partner has settled (free or locked).
    /// A moving chain is already stepping, so the call succeeds without changes.
    pub fn try_unlock_and_toggle(&mut self, partner: &mut AnchorState) -> bool {
        match *self {
            AnchorState::Locked => {
                if matches!(*partner, AnchorState::Free | AnchorState::Locked) {
                    *self = AnchorState::Moving;
                    *partner = AnchorState::Locked;
                    true
                } else {
                    false
                }
            }
            AnchorState::Moving => true,
            AnchorState::Free => {
                *self = AnchorState::Moving;
                *partner = AnchorState::Locked;
                true
            }
        }
    }
}
