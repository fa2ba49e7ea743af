use rand::Rng;

pub const MIN_SIZE: usize = 4;
pub const MAX_SIZE: usize = 19;

const CARVE_BUDGET_FACTOR: usize = 2;
const MAX_DEAD_END_STALLS: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

pub const DIRS: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

impl Dir {
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    fn index(self) -> usize {
        match self {
            Dir::Up => 0,
            Dir::Down => 1,
            Dir::Left => 2,
            Dir::Right => 3,
        }
    }
}

fn random_dir(rng: &mut impl Rng) -> Dir {
    let horizontal = rng.gen_range(0..2) == 1;
    let positive = rng.gen_range(0..2) == 1;
    match (horizontal, positive) {
        (true, true) => Dir::Right,
        (true, false) => Dir::Left,
        (false, true) => Dir::Down,
        (false, false) => Dir::Up,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
    Wall,
    Floor,
    Door,
    Key,
    Player,
}

#[derive(Clone, Copy, Debug)]
pub struct Cell {
    kind: CellKind,
    shadow: Option<CellKind>,
}

impl Cell {
    fn new(kind: CellKind) -> Self {
        Self { kind, shadow: None }
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn shadow(&self) -> Option<CellKind> {
        self.shadow
    }

    // One-level undo: the shadow keeps the kind that was overwritten last.
    pub fn set_kind(&mut self, kind: CellKind) {
        self.shadow = Some(self.kind);
        self.kind = kind;
    }

    pub fn recover(&mut self) {
        if let Some(prev) = self.shadow.take() {
            self.kind = prev;
        }
    }
}

pub struct Board {
    size: usize,
    cells: Vec<Vec<Cell>>,
    door: Pos,
}

impl Board {
    pub fn build_room(size: usize, rng: &mut impl Rng) -> Board {
        let mut cells = vec![vec![Cell::new(CellKind::Floor); size]; size];
        for (y, row) in cells.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                if x == 0 || x == size - 1 || y == 0 || y == size - 1 {
                    *cell = Cell::new(CellKind::Wall);
                }
            }
        }

        // Rejection-sample a ring cell for the door, skipping the corners so
        // the door always borders the interior along at least one axis.
        let door = loop {
            let x = rng.gen_range(0..size);
            let y = rng.gen_range(0..size);
            let on_ring = x == 0 || x == size - 1 || y == 0 || y == size - 1;
            let off_corner = (0 < x && x < size - 1) || (0 < y && y < size - 1);
            if on_ring && off_corner {
                cells[y][x].set_kind(CellKind::Door);
                break Pos { x, y };
            }
        };

        Board { size, cells, door }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn door(&self) -> Pos {
        self.door
    }

    pub fn kind_at(&self, pos: Pos) -> CellKind {
        self.cells[pos.y][pos.x].kind()
    }

    pub fn cell(&self, pos: Pos) -> &Cell {
        &self.cells[pos.y][pos.x]
    }

    pub fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.cells[pos.y][pos.x]
    }

    pub fn is_outer_ring(&self, x: usize, y: usize) -> bool {
        x == 0 || x == self.size - 1 || y == 0 || y == self.size - 1
    }

    pub fn is_inner_area(&self, x: usize, y: usize) -> bool {
        x > 0 && x < self.size - 1 && y > 0 && y < self.size - 1
    }

    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if nx < 0 || ny < 0 || nx >= self.size as isize || ny >= self.size as isize {
            return None;
        }
        Some(Pos {
            x: nx as usize,
            y: ny as usize,
        })
    }

    // The interior cell next to the door; the door predicate in build_room
    // guarantees one exists.
    pub fn seed_by_door(&self) -> Pos {
        DIRS.iter()
            .filter_map(|dir| self.neighbor(self.door, *dir))
            .find(|pos| self.is_inner_area(pos.x, pos.y))
            .expect("door always borders the interior")
    }

    fn fill_inner_area(&mut self) {
        for y in 1..self.size - 1 {
            for x in 1..self.size - 1 {
                self.cells[y][x].set_kind(CellKind::Wall);
            }
        }
    }

    /// Randomized depth-first carver. Fills the interior with walls, then
    /// carves a corridor network outward from the cell next to the door,
    /// backtracking along its trail when it runs out of directions. Returns
    /// the number of carved cells. No-op below difficulty 2.
    pub fn build_maze(&mut self, difficulty: u8, rng: &mut impl Rng) -> usize {
        if difficulty <= 1 {
            return 0;
        }

        self.fill_inner_area();

        let inner = self.size - 2;
        let target = CARVE_BUDGET_FACTOR * inner * inner;
        let mut visited = vec![false; self.size * self.size];
        let mut trail: Vec<Pos> = Vec::new();
        let mut tried = [false; 4];
        let mut stalls = 0u32;
        let mut placed = 0usize;

        let mut cursor = self.seed_by_door();
        self.carve(cursor, &mut visited, &mut trail, &mut placed);

        // The budget is deliberately oversized; typical runs end through the
        // stall counter once no carvable cell is reachable.
        while placed < target {
            let dir = random_dir(rng);
            if !tried[dir.index()] {
                tried[dir.index()] = true;
                if let Some(next) = self.carve_candidate(cursor, dir, &visited) {
                    self.carve(next, &mut visited, &mut trail, &mut placed);
                    cursor = next;
                    tried = [false; 4];
                    stalls = 0;
                    // Bias corridors toward two-cell segments: push one more
                    // step the same way when that cell is still untouched.
                    if let Some(ahead) = self.extend_candidate(cursor, dir, &visited) {
                        self.carve(ahead, &mut visited, &mut trail, &mut placed);
                        cursor = ahead;
                    }
                    continue;
                }
            }
            if tried.iter().all(|&t| t) {
                if trail.len() > 1 {
                    trail.pop();
                    cursor = *trail.last().expect("trail keeps the seed cell");
                    tried = [false; 4];
                } else {
                    stalls += 1;
                    if stalls > MAX_DEAD_END_STALLS {
                        break;
                    }
                }
            }
        }

        placed
    }

    fn carve(&mut self, pos: Pos, visited: &mut [bool], trail: &mut Vec<Pos>, placed: &mut usize) {
        self.cells[pos.y][pos.x].set_kind(CellKind::Floor);
        visited[pos.y * self.size + pos.x] = true;
        trail.push(pos);
        *placed += 1;
    }

    // A cell is carvable when it is interior, unvisited, and the cell one
    // further step the same way is also unvisited; the look-ahead keeps a
    // wall between new corridors and territory already carved.
    fn carve_candidate(&self, from: Pos, dir: Dir, visited: &[bool]) -> Option<Pos> {
        let next = self.neighbor(from, dir)?;
        if !self.is_inner_area(next.x, next.y) || visited[next.y * self.size + next.x] {
            return None;
        }
        if let Some(ahead) = self.neighbor(next, dir) {
            if visited[ahead.y * self.size + ahead.x] {
                return None;
            }
        }
        Some(next)
    }

    // The repeat step skips the look-ahead; it only ever extends into a cell
    // whose straight-ahead wall was already checked by the primary move.
    fn extend_candidate(&self, from: Pos, dir: Dir, visited: &[bool]) -> Option<Pos> {
        let next = self.neighbor(from, dir)?;
        if !self.is_inner_area(next.x, next.y) || visited[next.y * self.size + next.x] {
            return None;
        }
        Some(next)
    }

    /// Overlays the player and the key on two random interior floor cells.
    /// The player claims its cell first, so the key can never share it.
    pub fn place_interactables(&mut self, rng: &mut impl Rng) -> (Pos, Pos) {
        let player = self.place_on_random_floor(CellKind::Player, rng);
        let key = self.place_on_random_floor(CellKind::Key, rng);
        (player, key)
    }

    fn place_on_random_floor(&mut self, kind: CellKind, rng: &mut impl Rng) -> Pos {
        loop {
            let x = rng.gen_range(0..self.size);
            let y = rng.gen_range(0..self.size);
            if self.is_inner_area(x, y) && self.cells[y][x].kind() == CellKind::Floor {
                self.cells[y][x].set_kind(kind);
                return Pos { x, y };
            }
        }
    }

    pub fn generate(size: usize, difficulty: u8, rng: &mut impl Rng) -> (Board, Pos) {
        let mut board = Board::build_room(size, rng);
        board.build_maze(difficulty, rng);
        let (player, _key) = board.place_interactables(rng);
        (board, player)
    }
}

#[cfg(test)]
impl Board {
    // Builds a board from ascii art: '#' wall, '.' floor, 'D' door,
    // 'K' key over floor, 'P' player over floor. Returns the player cell.
    pub(crate) fn from_art(art: &str) -> (Board, Pos) {
        let rows: Vec<&str> = art.trim().lines().map(|l| l.trim()).collect();
        let size = rows.len();
        let mut cells = vec![vec![Cell::new(CellKind::Floor); size]; size];
        let mut door = None;
        let mut player = None;
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), size, "art must be square");
            for (x, ch) in row.chars().enumerate() {
                let cell = &mut cells[y][x];
                match ch {
                    '#' => *cell = Cell::new(CellKind::Wall),
                    '.' => {}
                    'D' => {
                        *cell = Cell::new(CellKind::Wall);
                        cell.set_kind(CellKind::Door);
                        door = Some(Pos { x, y });
                    }
                    'K' => cell.set_kind(CellKind::Key),
                    'P' => {
                        cell.set_kind(CellKind::Player);
                        player = Some(Pos { x, y });
                    }
                    other => panic!("unknown art cell {other:?}"),
                }
            }
        }
        let board = Board {
            size,
            cells,
            door: door.expect("art needs a door"),
        };
        (board, player.expect("art needs a player"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn cell_keeps_one_level_of_undo() {
        let mut cell = Cell::new(CellKind::Floor);
        cell.set_kind(CellKind::Key);
        cell.set_kind(CellKind::Player);
        assert_eq!(cell.kind(), CellKind::Player);
        assert_eq!(cell.shadow(), Some(CellKind::Key));
        cell.recover();
        assert_eq!(cell.kind(), CellKind::Key);
        assert_eq!(cell.shadow(), None);
        // Recovering with an empty shadow keeps the current kind.
        cell.recover();
        assert_eq!(cell.kind(), CellKind::Key);
    }

    #[test]
    fn ring_and_interior_partition_the_grid() {
        let board = Board::build_room(7, &mut rng(1));
        for y in 0..7 {
            for x in 0..7 {
                assert_ne!(board.is_outer_ring(x, y), board.is_inner_area(x, y));
            }
        }
    }

    #[test]
    fn room_has_walled_ring_floored_interior_and_one_door() {
        for size in MIN_SIZE..=MAX_SIZE {
            let board = Board::build_room(size, &mut rng(size as u64));
            let mut doors = 0;
            for y in 0..size {
                for x in 0..size {
                    let kind = board.kind_at(Pos { x, y });
                    if board.is_outer_ring(x, y) {
                        if kind == CellKind::Door {
                            doors += 1;
                        } else {
                            assert_eq!(kind, CellKind::Wall);
                        }
                    } else {
                        assert_eq!(kind, CellKind::Floor);
                    }
                }
            }
            assert_eq!(doors, 1);
        }
    }

    #[test]
    fn door_is_never_an_isolated_corner() {
        for seed in 0..50 {
            let size = MIN_SIZE + (seed as usize % (MAX_SIZE - MIN_SIZE + 1));
            let board = Board::build_room(size, &mut rng(seed));
            let door = board.door();
            assert!(board.is_outer_ring(door.x, door.y));
            assert!(
                (0 < door.x && door.x < size - 1) || (0 < door.y && door.y < size - 1),
                "door at {door:?} on a {size}x{size} board has no interior neighbor"
            );
            let seed_cell = board.seed_by_door();
            assert!(board.is_inner_area(seed_cell.x, seed_cell.y));
        }
    }

    #[test]
    fn maze_is_skipped_at_base_difficulty() {
        let mut board = Board::build_room(9, &mut rng(3));
        let carved = board.build_maze(1, &mut rng(4));
        assert_eq!(carved, 0);
        for y in 1..8 {
            for x in 1..8 {
                assert_eq!(board.kind_at(Pos { x, y }), CellKind::Floor);
            }
        }
    }

    fn interior_floors(board: &Board) -> Vec<Pos> {
        let mut floors = Vec::new();
        for y in 0..board.size() {
            for x in 0..board.size() {
                if board.is_inner_area(x, y) && board.kind_at(Pos { x, y }) == CellKind::Floor {
                    floors.push(Pos { x, y });
                }
            }
        }
        floors
    }

    fn reachable_from(board: &Board, start: Pos) -> Vec<Pos> {
        let mut seen = vec![false; board.size() * board.size()];
        let mut queue = VecDeque::new();
        seen[start.y * board.size() + start.x] = true;
        queue.push_back(start);
        let mut out = vec![start];
        while let Some(pos) = queue.pop_front() {
            for dir in DIRS {
                let Some(next) = board.neighbor(pos, dir) else {
                    continue;
                };
                if seen[next.y * board.size() + next.x]
                    || !board.is_inner_area(next.x, next.y)
                    || board.kind_at(next) != CellKind::Floor
                {
                    continue;
                }
                seen[next.y * board.size() + next.x] = true;
                out.push(next);
                queue.push_back(next);
            }
        }
        out
    }

    #[test]
    fn maze_terminates_and_is_connected_for_all_sizes_and_difficulties() {
        for size in MIN_SIZE..=MAX_SIZE {
            for difficulty in 2..=5u8 {
                let seed = (size * 10 + difficulty as usize) as u64;
                let mut board = Board::build_room(size, &mut rng(seed));
                let carved = board.build_maze(difficulty, &mut rng(seed + 1));

                let inner = size - 2;
                assert!(carved >= 2, "carver never left the seed cell");
                assert!(carved <= inner * inner);

                let floors = interior_floors(&board);
                assert_eq!(carved, floors.len(), "count must match carved floor cells");

                let start = board.seed_by_door();
                assert_eq!(board.kind_at(start), CellKind::Floor, "seed must stay carved");
                let reached = reachable_from(&board, start);
                assert_eq!(
                    reached.len(),
                    floors.len(),
                    "carved cells must form one component ({}x{} difficulty {})",
                    size,
                    size,
                    difficulty
                );
            }
        }
    }

    #[test]
    fn maze_leaves_walls_between_corridors_on_larger_boards() {
        // Not a hard guarantee of the algorithm, but across a handful of
        // seeds a 12x12 interior should never carve completely open.
        let mut fully_open = 0;
        for seed in 0..8 {
            let mut board = Board::build_room(14, &mut rng(seed));
            board.build_maze(3, &mut rng(seed + 100));
            let inner = 12 * 12;
            if interior_floors(&board).len() == inner {
                fully_open += 1;
            }
        }
        assert!(fully_open < 8, "every run carved the whole interior open");
    }

    #[test]
    fn interactables_land_on_distinct_interior_floor_cells() {
        for difficulty in [1u8, 3, 5] {
            let mut board = Board::build_room(10, &mut rng(7));
            board.build_maze(difficulty, &mut rng(8));
            let (player, key) = board.place_interactables(&mut rng(9));

            assert_ne!(player, key);
            for pos in [player, key] {
                assert!(board.is_inner_area(pos.x, pos.y));
                assert_eq!(board.cell(pos).shadow(), Some(CellKind::Floor));
            }
            assert_eq!(board.kind_at(player), CellKind::Player);
            assert_eq!(board.kind_at(key), CellKind::Key);
        }
    }

    #[test]
    fn rebuilding_drops_all_previous_markers() {
        let (mut board, _player) = Board::generate(8, 3, &mut rng(11));
        // Scribble some state a finished round would leave behind.
        board.cell_mut(Pos { x: 3, y: 3 }).set_kind(CellKind::Key);

        let fresh = Board::build_room(8, &mut rng(12));
        let mut special = 0;
        for y in 0..8 {
            for x in 0..8 {
                match fresh.kind_at(Pos { x, y }) {
                    CellKind::Player | CellKind::Key => panic!("residual marker survived"),
                    CellKind::Door => special += 1,
                    _ => {}
                }
            }
        }
        assert_eq!(special, 1);
    }

    #[test]
    fn example_round_at_size_five_difficulty_one() {
        let mut r = rng(21);
        let mut board = Board::build_room(5, &mut r);
        assert_eq!(board.build_maze(1, &mut r), 0);
        let (player, key) = board.place_interactables(&mut r);
        let floors = interior_floors(&board);
        // 9 interior cells minus player and key.
        assert_eq!(floors.len(), 7);
        assert!(board.is_inner_area(player.x, player.y));
        assert!(board.is_inner_area(key.x, key.y));
    }
}
