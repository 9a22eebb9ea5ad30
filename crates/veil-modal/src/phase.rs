#![forbid(unsafe_code)]

//! Per-modal lifecycle phases and the hooks that move between them.
//!
//! ```text
//!            before_enter            after_enter
//!   Hidden ───────────────▶ Entering ───────────▶ Shown
//!     ▲  ◀─────────────────    │                  │  ▲
//!     │    enter_cancelled                        │  │ leave_cancelled
//!     │                                before_leave  │
//!     │            after_leave                    ▼  │
//!     └──────────────────────────────────────── Leaving
//!
//!   any phase ── destroy ──▶ Destroyed
//! ```
//!
//! A modal is *counted* by the controller from `after_enter` until
//! `after_leave`, i.e. while it is [`Shown`](ModalPhase::Shown) or
//! [`Leaving`](ModalPhase::Leaving).

/// Lifecycle phase of one modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModalPhase {
    #[default]
    Hidden,
    /// Show transition running; `before_enter` has fired.
    Entering,
    /// Show transition completed; `after_enter` has fired.
    Shown,
    /// Hide transition running.
    Leaving,
    /// Unmounted. Terminal.
    Destroyed,
}

impl ModalPhase {
    /// Whether the controller counts this modal as shown.
    #[inline]
    #[must_use]
    pub const fn is_counted(self) -> bool {
        matches!(self, Self::Shown | Self::Leaving)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Entering => "entering",
            Self::Shown => "shown",
            Self::Leaving => "leaving",
            Self::Destroyed => "destroyed",
        }
    }
}

impl std::fmt::Display for ModalPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A transition hook invoked by the host around its show/hide animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeEnter,
    AfterEnter,
    EnterCancelled,
    BeforeLeave,
    LeaveCancelled,
    AfterLeave,
}

impl Hook {
    /// Phase the modal must be in for this hook to run.
    #[must_use]
    pub const fn from_phase(self) -> ModalPhase {
        match self {
            Self::BeforeEnter => ModalPhase::Hidden,
            Self::AfterEnter | Self::EnterCancelled => ModalPhase::Entering,
            Self::BeforeLeave => ModalPhase::Shown,
            Self::LeaveCancelled | Self::AfterLeave => ModalPhase::Leaving,
        }
    }

    /// Phase the modal is in after this hook ran.
    #[must_use]
    pub const fn to_phase(self) -> ModalPhase {
        match self {
            Self::BeforeEnter => ModalPhase::Entering,
            Self::AfterEnter | Self::LeaveCancelled => ModalPhase::Shown,
            Self::BeforeLeave => ModalPhase::Leaving,
            Self::EnterCancelled | Self::AfterLeave => ModalPhase::Hidden,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeEnter => "before_enter",
            Self::AfterEnter => "after_enter",
            Self::EnterCancelled => "enter_cancelled",
            Self::BeforeLeave => "before_leave",
            Self::LeaveCancelled => "leave_cancelled",
            Self::AfterLeave => "after_leave",
        }
    }
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_HOOKS: [Hook; 6] = [
        Hook::BeforeEnter,
        Hook::AfterEnter,
        Hook::EnterCancelled,
        Hook::BeforeLeave,
        Hook::LeaveCancelled,
        Hook::AfterLeave,
    ];

    #[test]
    fn show_then_hide_returns_to_hidden() {
        let mut phase = ModalPhase::Hidden;
        for hook in [
            Hook::BeforeEnter,
            Hook::AfterEnter,
            Hook::BeforeLeave,
            Hook::AfterLeave,
        ] {
            assert_eq!(hook.from_phase(), phase, "{hook} out of order");
            phase = hook.to_phase();
        }
        assert_eq!(phase, ModalPhase::Hidden);
    }

    #[test]
    fn cancellations_undo_their_transition() {
        assert_eq!(
            Hook::EnterCancelled.to_phase(),
            Hook::BeforeEnter.from_phase()
        );
        assert_eq!(
            Hook::LeaveCancelled.to_phase(),
            Hook::BeforeLeave.from_phase()
        );
    }

    #[test]
    fn no_hook_leaves_or_enters_destroyed() {
        for hook in ALL_HOOKS {
            assert_ne!(hook.from_phase(), ModalPhase::Destroyed);
            assert_ne!(hook.to_phase(), ModalPhase::Destroyed);
        }
    }

    #[test]
    fn counted_phases() {
        assert!(!ModalPhase::Hidden.is_counted());
        assert!(!ModalPhase::Entering.is_counted());
        assert!(ModalPhase::Shown.is_counted());
        assert!(ModalPhase::Leaving.is_counted());
        assert!(!ModalPhase::Destroyed.is_counted());
    }
}
