use std::cmp::Ordering;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RoundRecord {
    pub size: usize,
    pub difficulty: u8,
    pub seconds: f64,
}

#[derive(Default)]
pub struct Scoreboard {
    rounds: Vec<RoundRecord>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: RoundRecord) {
        self.rounds.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn sorted(&self) -> Vec<RoundRecord> {
        let mut rounds = self.rounds.clone();
        rounds.sort_by(|a, b| a.seconds.partial_cmp(&b.seconds).unwrap_or(Ordering::Equal));
        rounds
    }

    pub fn by_size(&self, size: usize) -> Vec<RoundRecord> {
        self.sorted().into_iter().filter(|r| r.size == size).collect()
    }

    pub fn by_difficulty(&self, difficulty: u8) -> Vec<RoundRecord> {
        self.sorted()
            .into_iter()
            .filter(|r| r.difficulty == difficulty)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(entries: &[(usize, u8, f64)]) -> Scoreboard {
        let mut sb = Scoreboard::new();
        for &(size, difficulty, seconds) in entries {
            sb.add(RoundRecord {
                size,
                difficulty,
                seconds,
            });
        }
        sb
    }

    #[test]
    fn sorted_orders_by_time_ascending() {
        let sb = board_with(&[(5, 1, 30.5), (8, 3, 12.25), (10, 2, 19.0)]);
        let times: Vec<f64> = sb.sorted().iter().map(|r| r.seconds).collect();
        assert_eq!(times, vec![12.25, 19.0, 30.5]);
    }

    #[test]
    fn filters_keep_sort_order() {
        let sb = board_with(&[(5, 1, 30.5), (5, 2, 7.0), (8, 2, 12.0), (5, 2, 5.5)]);

        let by_size: Vec<f64> = sb.by_size(5).iter().map(|r| r.seconds).collect();
        assert_eq!(by_size, vec![5.5, 7.0, 30.5]);

        let by_diff: Vec<f64> = sb.by_difficulty(2).iter().map(|r| r.seconds).collect();
        assert_eq!(by_diff, vec![5.5, 7.0, 12.0]);

        assert!(sb.by_size(12).is_empty());
        assert!(sb.by_difficulty(5).is_empty());
    }

    #[test]
    fn empty_board_reports_empty() {
        assert!(Scoreboard::new().is_empty());
        assert!(!board_with(&[(4, 1, 1.0)]).is_empty());
    }
}
