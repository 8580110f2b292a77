//! A running puzzle: owns the state and publishes a snapshot after every change.

use super::logic::transition;
use super::types::{Action, PuzzleLayout, PuzzleState, PuzzleView};
use crate::board::{KnightRules, PieceKind, RulesAdapter, Square};
use crate::timer::{Clock, SystemClock};
use tokio::sync::watch;

pub struct PuzzleSession<R = KnightRules, C = SystemClock> {
    layout: PuzzleLayout,
    rules: R,
    clock: C,
    state: PuzzleState,
    updates: watch::Sender<PuzzleState>,
}

impl PuzzleSession {
    /// The built-in puzzle on the real wall clock.
    pub fn classic() -> Self {
        Self::new(PuzzleLayout::classic(), KnightRules, SystemClock)
    }
}

impl<R: RulesAdapter, C: Clock> PuzzleSession<R, C> {
    pub fn new(layout: PuzzleLayout, rules: R, clock: C) -> Self {
        let state = PuzzleState::initial(&layout);
        let (updates, _) = watch::channel(state.clone());
        Self {
            layout,
            rules,
            clock,
            state,
            updates,
        }
    }

    /// Run one action through the transition function.
    ///
    /// Subscribers are only notified when the state actually changed.
    pub fn dispatch(&mut self, action: Action) -> &PuzzleState {
        let now = self.clock.now();
        let next = transition(&self.layout, &self.rules, &self.state, action, now);
        if next != self.state {
            self.state = next;
            self.updates.send_replace(self.state.clone());
        }
        &self.state
    }

    pub fn attempt_move(&mut self, square: Square) -> &PuzzleState {
        self.dispatch(Action::PlaceKnight(square))
    }

    pub fn reset(&mut self) -> &PuzzleState {
        self.dispatch(Action::ResetGame)
    }

    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    pub fn layout(&self) -> &PuzzleLayout {
        &self.layout
    }

    /// Receiver that always holds the latest state.
    pub fn subscribe(&self) -> watch::Receiver<PuzzleState> {
        self.updates.subscribe()
    }

    /// Where the player's knight currently stands.
    pub fn knight_square(&self) -> Option<Square> {
        let player = self.layout.player();
        self.state
            .position
            .pieces()
            .find(|(_, p)| p.kind == PieceKind::Knight && p.color == player)
            .map(|(sq, _)| sq)
    }

    /// Squares the knight may legally jump to, before the puzzle's own rules.
    pub fn legal_destinations(&self) -> Vec<Square> {
        match self.knight_square() {
            Some(from) => self.rules.legal_destinations(&self.state.position, from),
            None => Vec::new(),
        }
    }

    pub fn view(&self) -> PuzzleView {
        PuzzleView::new(&self.layout, &self.state, self.clock.now())
    }
}
