use crate::model::*;
use rand::SeedableRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_chacha::ChaCha8Rng;

/// Deal and rule parameters for one game session. All containers share one
/// capacity; the box multiset is `colors * boxes_per_color`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub colors: usize,
    pub boxes_per_color: usize,
    pub filled_containers: usize,
    pub empty_containers: usize,
    pub capacity: usize,
    pub max_take_backs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            colors: 4,
            boxes_per_color: 4,
            filled_containers: 4,
            empty_containers: 2,
            capacity: 4,
            max_take_backs: 3,
        }
    }
}

impl EngineConfig {
    pub fn total_boxes(&self) -> usize {
        self.colors * self.boxes_per_color
    }

    pub fn total_containers(&self) -> usize {
        self.filled_containers + self.empty_containers
    }

    /// Misconfiguration is a programmer error, not a reachable game input.
    fn validate(&self) {
        assert!(self.colors >= 1 && self.colors <= MAX_COLORS);
        assert!(self.boxes_per_color >= 1);
        assert!(self.capacity >= 1);
        assert!(
            self.filled_containers * self.capacity >= self.total_boxes(),
            "dealt boxes must fit in the filled containers"
        );
    }
}

/// The active selection: a maximal visible same-color run from the top of one
/// container, indices ascending (bottom to top).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub container_id: usize,
    pub indices: Vec<usize>,
}

/// Handle for the deferred commit of an accepted move or undo. Tokens are
/// never reused; a token issued before a restart can no longer settle
/// anything.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SettleToken(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Move(MoveRecord),
    Undo(MoveRecord),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Pending {
    token: SettleToken,
    action: PendingAction,
}

/// What a container click did, for the presentation collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickOutcome {
    pub selection: Option<Selection>,
    /// Present when the click accepted a move; pass it back to `settle`
    /// after the animation delay.
    pub pending_move: Option<SettleToken>,
    pub completed_containers: Vec<usize>,
    pub is_game_complete: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoOutcome {
    pub accepted: bool,
    pub pending_undo: Option<SettleToken>,
}

/// The game-state machine. Owns the board, the selection, the move history
/// and the take-back budget; every public operation is total — invalid input
/// degrades to a no-op.
pub struct GameEngine {
    config: EngineConfig,
    rng: ChaCha8Rng,
    board: Board,
    hard_mode: bool,
    selection: Option<Selection>,
    completed: Vec<usize>,
    history: Vec<MoveRecord>,
    take_backs_used: usize,
    pending: Option<Pending>,
    next_token: u64,
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Deterministic engine: the same seed deals the same boards, in order,
    /// across restarts.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        config.validate();
        let mut engine = Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            board: Board::default(),
            hard_mode: false,
            selection: None,
            completed: Vec::new(),
            history: Vec::new(),
            take_backs_used: 0,
            pending: None,
            next_token: 0,
        };
        engine.new_game(false);
        engine
    }

    /// (Re)start. Replaces the whole model: fresh deal, empty history, full
    /// take-back budget. An in-flight move or undo is abandoned — its settle
    /// token goes stale and can never commit against the new board.
    pub fn new_game(&mut self, hard_mode: bool) {
        self.hard_mode = hard_mode;
        self.selection = None;
        self.pending = None;
        self.history.clear();
        self.take_backs_used = 0;
        self.board = self.deal();
        self.completed = self.board.get_completed_ids();
    }

    pub fn toggle_hard_mode(&mut self) {
        self.new_game(!self.hard_mode);
    }

    /// Uniformly shuffle the box multiset, then drop boxes one at a time
    /// into a randomly chosen not-yet-full container among the first
    /// `filled_containers`. Extra empty containers follow. No solvability
    /// check is made.
    fn deal(&mut self) -> Board {
        let config = self.config;
        let mut pieces: Vec<BoxPiece> = Vec::with_capacity(config.total_boxes());
        for color_id in 0..config.colors {
            for _ in 0..config.boxes_per_color {
                pieces.push(BoxPiece::new(color_id));
            }
        }
        pieces.shuffle(&mut self.rng);

        let mut containers: Vec<Container> = (1..=config.total_containers())
            .map(|id| Container::new(id, config.capacity))
            .collect();
        for piece in pieces {
            let open: Vec<usize> = (0..config.filled_containers)
                .filter(|&i| !containers[i].is_full())
                .collect();
            if let Some(&slot) = open.choose(&mut self.rng) {
                containers[slot].push_box(piece);
            }
        }
        if self.hard_mode {
            for container in &mut containers {
                container.hide_all_but_top();
            }
        }
        Board::new(containers)
    }

    /// Click dispatch. No selection: select the clicked container's top run.
    /// Same container: deselect. Other container: move if legal, otherwise
    /// the selection jumps to the clicked container. Clicks on completed
    /// containers, unknown ids, or while an operation is in flight are
    /// ignored entirely.
    pub fn handle_container_click(&mut self, container_id: usize) -> ClickOutcome {
        if self.pending.is_none()
            && !self.completed.contains(&container_id)
            && self.board.get_container(container_id).is_some()
        {
            match self.selection.clone() {
                None => {
                    self.selection = self.select_top_run(container_id);
                }
                Some(selection) if selection.container_id == container_id => {
                    self.selection = None;
                }
                Some(selection) => {
                    if let Some(record) = self.board.stage_move(
                        selection.container_id,
                        container_id,
                        &selection.indices,
                        self.hard_mode,
                    ) {
                        self.selection = None;
                        let token = self.issue_token();
                        self.pending = Some(Pending {
                            token,
                            action: PendingAction::Move(record),
                        });
                        return self.click_outcome(Some(token));
                    }
                    self.selection = self.select_top_run(container_id);
                }
            }
        }
        self.click_outcome(None)
    }

    /// Take back the most recent move. Accepted only when there is history,
    /// budget left and nothing already in flight; one budget unit per undo no
    /// matter how many boxes the move carried.
    pub fn undo(&mut self) -> UndoOutcome {
        if !self.can_undo() {
            return UndoOutcome {
                accepted: false,
                pending_undo: None,
            };
        }
        let Some(record) = self.history.pop() else {
            return UndoOutcome {
                accepted: false,
                pending_undo: None,
            };
        };
        self.take_backs_used += 1;
        self.selection = None;
        let token = self.issue_token();
        self.pending = Some(Pending {
            token,
            action: PendingAction::Undo(record),
        });
        UndoOutcome {
            accepted: true,
            pending_undo: Some(token),
        }
    }

    /// Phase two: commit the pending operation the token refers to. Returns
    /// false (and changes nothing) for stale or unknown tokens, including
    /// every token issued before the last restart.
    pub fn settle(&mut self, token: SettleToken) -> bool {
        match self.pending.take() {
            Some(pending) if pending.token == token => {
                match pending.action {
                    PendingAction::Move(record) => {
                        self.board.commit_move(&record);
                        self.history.push(record);
                    }
                    PendingAction::Undo(record) => {
                        self.board.commit_undo(&record);
                    }
                }
                self.completed = self.board.get_completed_ids();
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// Replace the board wholesale (the front-end/test hook). Clears the
    /// selection, history and budget, and abandons anything in flight.
    pub fn load_board(&mut self, board: Board) {
        self.board = board;
        self.selection = None;
        self.pending = None;
        self.history.clear();
        self.take_backs_used = 0;
        self.completed = self.board.get_completed_ids();
    }

    pub fn get_board(&self) -> &Board {
        &self.board
    }

    pub fn get_containers(&self) -> &[Container] {
        self.board.get_containers()
    }

    pub fn get_selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn get_completed_containers(&self) -> &[usize] {
        &self.completed
    }

    /// Complete when as many containers are consolidated as there are
    /// colors.
    pub fn is_game_complete(&self) -> bool {
        self.completed.len() == self.config.colors
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
            && self.take_backs_used < self.config.max_take_backs
            && self.pending.is_none()
    }

    pub fn is_moving(&self) -> bool {
        self.pending.is_some()
    }

    pub fn get_pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref().map(|p| &p.action)
    }

    pub fn is_hard_mode(&self) -> bool {
        self.hard_mode
    }

    pub fn get_take_backs_used(&self) -> usize {
        self.take_backs_used
    }

    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }

    fn select_top_run(&self, container_id: usize) -> Option<Selection> {
        let container = self.board.get_container(container_id)?;
        let indices = container.top_run();
        if indices.is_empty() {
            None
        } else {
            Some(Selection {
                container_id,
                indices,
            })
        }
    }

    fn issue_token(&mut self) -> SettleToken {
        self.next_token += 1;
        SettleToken(self.next_token)
    }

    fn click_outcome(&self, pending_move: Option<SettleToken>) -> ClickOutcome {
        ClickOutcome {
            selection: self.selection.clone(),
            pending_move,
            completed_containers: self.completed.clone(),
            is_game_complete: self.is_game_complete(),
        }
    }
}
