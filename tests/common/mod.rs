use ranked_index::{EntityId, Entry, Rank, RankError, Ranked, RankingList, Result};

/// Sorted-vector leaderboard used as the reference for `RankedEngine`.
///
/// Every operation is a linear scan or a single binary search over one `Vec`, which
/// makes it slow but obviously correct.
#[derive(Debug, Default)]
pub struct SortedVecRanking {
    entries: Vec<Entry>,
}

impl SortedVecRanking {
    pub fn new() -> Self {
        Self::default()
    }

    fn position_of_id(&self, id: EntityId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn insert_sorted(&mut self, entry: Entry) -> Rank {
        let position = self.entries.partition_point(|e| e < &entry);
        self.entries.insert(position, entry);
        Rank::from_position(position)
    }

    fn ranked(&self, position: usize) -> Ranked {
        Ranked {
            entry: self.entries[position],
            rank: Rank::from_position(position),
        }
    }
}

impl RankingList for SortedVecRanking {
    fn add(&mut self, entry: Entry) -> Result<Rank> {
        if self.position_of_id(entry.id).is_some() {
            return Err(RankError::DuplicateId(entry.id));
        }
        Ok(self.insert_sorted(entry))
    }

    fn update(&mut self, entry: Entry) -> Result<Rank> {
        let position = self.position_of_id(entry.id).ok_or(RankError::NotFound(entry.id))?;
        self.entries.remove(position);
        Ok(self.insert_sorted(entry))
    }

    fn remove(&mut self, id: EntityId) -> Result<Entry> {
        let position = self.position_of_id(id).ok_or(RankError::NotFound(id))?;
        Ok(self.entries.remove(position))
    }

    fn rank_of(&self, id: EntityId) -> Option<Ranked> {
        self.position_of_id(id).map(|position| self.ranked(position))
    }

    fn top_n(&self, n: usize) -> Vec<Ranked> {
        (0..n.min(self.entries.len())).map(|position| self.ranked(position)).collect()
    }

    fn around(&self, id: EntityId, k: usize) -> Result<Vec<Ranked>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let position = self.position_of_id(id).ok_or(RankError::NotFound(id))?;
        let lo = position.saturating_sub(k);
        let hi = (position + k).min(self.entries.len() - 1);
        Ok((lo..=hi).map(|p| self.ranked(p)).collect())
    }

    fn count(&self) -> usize {
        self.entries.len()
    }
}
