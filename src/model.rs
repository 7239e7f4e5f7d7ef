use std::collections::BTreeMap;

/// Highest number of distinct colors the single-letter representation
/// can express (A-Z).
pub const MAX_COLORS: usize = 26;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BoxPiece {
    color_id: usize,
    hidden: bool,
}

impl BoxPiece {
    pub fn new(color_id: usize) -> Self {
        Self {
            color_id,
            hidden: false,
        }
    }

    pub fn new_hidden(color_id: usize) -> Self {
        Self {
            color_id,
            hidden: true,
        }
    }

    /// Parse a single character: uppercase letter = visible box, lowercase
    /// letter = hidden box, anything else = no box.
    pub fn new_from_repr(ch: char) -> Option<Self> {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let color_id = (ch.to_ascii_uppercase() as u8 - b'A') as usize;
        Some(Self {
            color_id,
            hidden: ch.is_ascii_lowercase(),
        })
    }

    /// True color of the box. Readable even when hidden: move legality and
    /// completion always use the real color, only selection and display are
    /// gated on visibility.
    pub fn get_color_id(&self) -> usize {
        self.color_id
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn reveal(&mut self) {
        self.hidden = false;
    }

    pub fn get_letter_representation(&self) -> char {
        let letter = (b'A' + (self.color_id % MAX_COLORS) as u8) as char;
        if self.hidden {
            letter.to_ascii_lowercase()
        } else {
            letter
        }
    }
}

/// Fixed-capacity stack of boxes. Index 0 is the bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    id: usize,
    capacity: usize,
    boxes: Vec<BoxPiece>,
}

impl Container {
    pub fn new(id: usize, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            boxes: Vec::with_capacity(capacity),
        }
    }

    /// Parse a container from its letter form, e.g. "aAB." is a capacity-4
    /// container holding a hidden A, a visible A and a visible B. Every
    /// character counts toward capacity, so trailing dots encode free slots.
    pub fn new_from_repr(id: usize, repr: &str) -> Self {
        let s = repr.trim();
        let mut boxes = Vec::new();
        for ch in s.chars() {
            if let Some(piece) = BoxPiece::new_from_repr(ch) {
                boxes.push(piece);
            }
        }
        Self {
            id,
            capacity: s.chars().count(),
            boxes,
        }
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_boxes(&self) -> &[BoxPiece] {
        &self.boxes
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.boxes.len() >= self.capacity
    }

    pub fn get_filled_amount(&self) -> usize {
        self.boxes.len()
    }

    pub fn get_empty_space(&self) -> usize {
        self.capacity - self.boxes.len()
    }

    pub fn get_top_box(&self) -> Option<&BoxPiece> {
        self.boxes.last()
    }

    /// Indices (ascending) of the maximal visible same-color run at the top.
    /// Empty when the container is empty or its top box is hidden.
    pub fn top_run(&self) -> Vec<usize> {
        let Some(top) = self.get_top_box() else {
            return Vec::new();
        };
        if top.is_hidden() {
            return Vec::new();
        }
        let top_color = top.get_color_id();
        let mut indices = Vec::new();
        for i in (0..self.boxes.len()).rev() {
            let piece = &self.boxes[i];
            if piece.is_hidden() || piece.get_color_id() != top_color {
                break;
            }
            indices.push(i);
        }
        indices.reverse();
        indices
    }

    /// Completed: filled to capacity with a single color, nothing hidden.
    pub fn is_completed(&self) -> bool {
        if !self.is_full() || self.boxes.is_empty() {
            return false;
        }
        let first_color = self.boxes[0].get_color_id();
        self.boxes
            .iter()
            .all(|b| !b.is_hidden() && b.get_color_id() == first_color)
    }

    pub fn push_box(&mut self, piece: BoxPiece) -> bool {
        if self.is_full() {
            return false;
        }
        self.boxes.push(piece);
        true
    }

    pub fn push_boxes(&mut self, pieces: &[BoxPiece]) -> bool {
        if pieces.len() > self.get_empty_space() {
            return false;
        }
        self.boxes.extend_from_slice(pieces);
        true
    }

    /// Remove the top `count` boxes, returned in bottom-to-top order.
    pub fn remove_top(&mut self, count: usize) -> Vec<BoxPiece> {
        let keep = self.boxes.len().saturating_sub(count);
        self.boxes.split_off(keep)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<BoxPiece> {
        if index < self.boxes.len() {
            Some(self.boxes.remove(index))
        } else {
            None
        }
    }

    pub fn reveal_top(&mut self) {
        if let Some(top) = self.boxes.last_mut() {
            top.reveal();
        }
    }

    pub fn hide_box(&mut self, index: usize) {
        if let Some(piece) = self.boxes.get_mut(index) {
            piece.hide();
        }
    }

    /// Hard-mode deal rule: everything below the top box starts hidden.
    pub fn hide_all_but_top(&mut self) {
        let len = self.boxes.len();
        if len < 2 {
            return;
        }
        for piece in &mut self.boxes[..len - 1] {
            piece.hide();
        }
    }

    pub fn get_text_representation(&self) -> String {
        let mut repr = String::with_capacity(self.capacity);
        for piece in &self.boxes {
            repr.push(piece.get_letter_representation());
        }
        for _ in self.boxes.len()..self.capacity {
            repr.push('.');
        }
        repr
    }
}

/// One committed (or staged) relocation. `indices` and `boxes` describe the
/// exact subset that actually moved, which may be smaller than the selection
/// it came from when the destination ran out of space.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: usize,
    pub to: usize,
    pub indices: Vec<usize>,
    pub boxes: Vec<BoxPiece>,
    /// Whether committing this move flipped the source's newly exposed top
    /// from hidden to visible. Undo re-hides exactly that box, so a
    /// move-then-undo round trip restores visibility flags bit for bit.
    pub revealed_source_top: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Board {
    containers: Vec<Container>,
}

impl Board {
    pub fn new(containers: Vec<Container>) -> Self {
        Self { containers }
    }

    /// Parse a board from container reprs joined with ';', e.g.
    /// "AABB;BBAA;....". Ids are assigned 1..N in order.
    pub fn new_from_repr(repr: &str) -> Self {
        let containers = repr
            .split(';')
            .enumerate()
            .map(|(i, part)| Container::new_from_repr(i + 1, part))
            .collect();
        Self { containers }
    }

    pub fn get_containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn get_container(&self, id: usize) -> Option<&Container> {
        self.containers.iter().find(|c| c.get_id() == id)
    }

    fn get_container_mut(&mut self, id: usize) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.get_id() == id)
    }

    /// Pure legality predicate. Assumes the indices came from the selection
    /// engine and are therefore a homogeneous top run; internal homogeneity
    /// is not re-checked here. Completed-container exclusion and same-id
    /// rejection are the caller's responsibility.
    pub fn is_legal_move(&self, from_id: usize, to_id: usize, indices: &[usize]) -> bool {
        let Some(from) = self.get_container(from_id) else {
            return false;
        };
        let Some(to) = self.get_container(to_id) else {
            return false;
        };
        if from.is_empty() || indices.is_empty() {
            return false;
        }
        if indices.iter().any(|&i| i >= from.get_filled_amount()) {
            return false;
        }
        if to.get_empty_space() == 0 {
            return false;
        }
        match to.get_top_box() {
            None => true,
            Some(top) => {
                !top.is_hidden()
                    && top.get_color_id() == from.get_boxes()[indices[0]].get_color_id()
            }
        }
    }

    /// Phase one of a move: compute the record without touching the board.
    /// Applies the split rule — when the destination cannot take the whole
    /// selection, only the topmost boxes that fit are staged; the rest never
    /// leave the source. Returns None if the move was never legal.
    pub fn stage_move(
        &self,
        from_id: usize,
        to_id: usize,
        indices: &[usize],
        hard_mode: bool,
    ) -> Option<MoveRecord> {
        if !self.is_legal_move(from_id, to_id, indices) {
            return None;
        }
        let from = self.get_container(from_id)?;
        let to = self.get_container(to_id)?;

        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        let avail = to.get_empty_space();
        let moved: Vec<usize> = if sorted.len() > avail {
            sorted[sorted.len() - avail..].to_vec()
        } else {
            sorted
        };
        let boxes: Vec<BoxPiece> = moved.iter().map(|&i| from.get_boxes()[i]).collect();

        let remaining = from.get_filled_amount() - moved.len();
        let revealed_source_top =
            hard_mode && remaining > 0 && from.get_boxes()[remaining - 1].is_hidden();

        Some(MoveRecord {
            from: from_id,
            to: to_id,
            indices: moved,
            boxes,
            revealed_source_top,
        })
    }

    /// Phase two of a move: apply a staged record. No-op on unknown ids.
    pub fn commit_move(&mut self, record: &MoveRecord) {
        if let Some(from) = self.get_container_mut(record.from) {
            for &index in record.indices.iter().rev() {
                from.remove_at(index);
            }
            if record.revealed_source_top {
                from.reveal_top();
            }
        }
        if let Some(to) = self.get_container_mut(record.to) {
            to.push_boxes(&record.boxes);
        }
    }

    /// Inverse of `commit_move`: boxes leave the destination's top and land
    /// back on the source's top in their original order; a top revealed by
    /// the move is hidden again.
    pub fn commit_undo(&mut self, record: &MoveRecord) {
        if let Some(to) = self.get_container_mut(record.to) {
            to.remove_top(record.boxes.len());
        }
        if let Some(from) = self.get_container_mut(record.from) {
            if record.revealed_source_top {
                let top = from.get_filled_amount();
                if top > 0 {
                    from.hide_box(top - 1);
                }
            }
            from.push_boxes(&record.boxes);
        }
    }

    pub fn get_completed_ids(&self) -> Vec<usize> {
        self.containers
            .iter()
            .filter(|c| c.is_completed())
            .map(|c| c.get_id())
            .collect()
    }

    /// Color multiset across all containers. Conserved by every move and
    /// undo; tests compare this against the initial deal.
    pub fn get_color_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for container in &self.containers {
            for piece in container.get_boxes() {
                *counts.entry(piece.get_color_id()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn get_text_representation(&self) -> String {
        let parts: Vec<String> = self
            .containers
            .iter()
            .map(|c| c.get_text_representation())
            .collect();
        parts.join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_repr_round_trip() {
        let visible = BoxPiece::new(2);
        assert_eq!(visible.get_letter_representation(), 'C');
        let hidden = BoxPiece::new_hidden(2);
        assert_eq!(hidden.get_letter_representation(), 'c');
        assert_eq!(BoxPiece::new_from_repr('C'), Some(visible));
        assert_eq!(BoxPiece::new_from_repr('c'), Some(hidden));
        assert_eq!(BoxPiece::new_from_repr('.'), None);
    }

    #[test]
    fn container_repr_round_trip() {
        let container = Container::new_from_repr(1, "aAB.");
        assert_eq!(container.get_capacity(), 4);
        assert_eq!(container.get_filled_amount(), 3);
        assert!(container.get_boxes()[0].is_hidden());
        assert_eq!(container.get_text_representation(), "aAB.");
    }

    #[test]
    fn top_run_stops_at_color_change() {
        let container = Container::new_from_repr(1, "ABB.");
        assert_eq!(container.top_run(), vec![1, 2]);
    }

    #[test]
    fn top_run_includes_whole_container_when_uniform() {
        let container = Container::new_from_repr(1, "AAAA");
        assert_eq!(container.top_run(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn top_run_empty_for_hidden_top() {
        let container = Container::new_from_repr(1, "Aa..");
        assert!(container.top_run().is_empty());
        assert!(Container::new(1, 4).top_run().is_empty());
    }

    #[test]
    fn top_run_stops_at_hidden_box() {
        // Same real color underneath, but hidden boxes never join a run.
        let container = Container::new_from_repr(1, "bBB.");
        assert_eq!(container.top_run(), vec![1, 2]);
    }

    #[test]
    fn completion_requires_full_uniform_visible() {
        assert!(Container::new_from_repr(1, "AAAA").is_completed());
        assert!(!Container::new_from_repr(1, "AAA.").is_completed());
        assert!(!Container::new_from_repr(1, "AAAB").is_completed());
        assert!(!Container::new_from_repr(1, "aAAA").is_completed());
        assert!(!Container::new(1, 4).is_completed());
    }

    #[test]
    fn legality_checks_destination_top() {
        let board = Board::new_from_repr("ABB.;B...;b...;....;BBBB");
        // Matching visible top.
        assert!(board.is_legal_move(1, 2, &[1, 2]));
        // Hidden top never matches, even with the same real color under it.
        assert!(!board.is_legal_move(2, 3, &[0]));
        // Empty destination always matches.
        assert!(board.is_legal_move(1, 4, &[1, 2]));
        // Full destination has no room.
        assert!(!board.is_legal_move(1, 5, &[1, 2]));
        // Unknown ids and empty sources are rejected.
        assert!(!board.is_legal_move(9, 2, &[0]));
        assert!(!board.is_legal_move(4, 2, &[0]));
    }

    #[test]
    fn stage_move_splits_to_available_space() {
        let board = Board::new_from_repr("BAAA;AAA.");
        let record = board.stage_move(1, 2, &[1, 2, 3], false).unwrap();
        // Only the topmost box fits.
        assert_eq!(record.indices, vec![3]);
        assert_eq!(record.boxes, vec![BoxPiece::new(0)]);
    }

    #[test]
    fn commit_move_relocates_and_reveals() {
        let mut board = Board::new_from_repr("aaBB;....");
        let record = board.stage_move(1, 2, &[2, 3], true).unwrap();
        assert!(record.revealed_source_top);
        board.commit_move(&record);
        assert_eq!(board.get_text_representation(), "aA..;BB..");
    }

    #[test]
    fn commit_undo_restores_board_and_flags() {
        let mut board = Board::new_from_repr("aaBB;B...");
        let before = board.clone();
        let record = board.stage_move(1, 2, &[2, 3], true).unwrap();
        board.commit_move(&record);
        board.commit_undo(&record);
        assert_eq!(board, before);
    }

    #[test]
    fn color_counts_survive_moves() {
        let mut board = Board::new_from_repr("ABBA;BA..;....");
        let initial = board.get_color_counts();
        let record = board.stage_move(2, 3, &[1], false).unwrap();
        board.commit_move(&record);
        assert_eq!(board.get_color_counts(), initial);
    }
}
