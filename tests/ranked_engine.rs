mod common;

use common::SortedVecRanking;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use ranked_index::{EngineConfig, Entry, Rank, RankError, Ranked, RankedEngine, RankingList, Timestamp};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

fn small_engine() -> RankedEngine {
    RankedEngine::with_config(EngineConfig::default().bucket_capacity(4)).unwrap()
}

fn rank(engine: &RankedEngine, id: u64) -> Option<Rank> {
    engine.rank_of(id).map(|r| r.rank)
}

fn ids(ranked: &[Ranked]) -> Vec<u64> {
    ranked.iter().map(|r| r.entry.id).collect()
}

fn ranks(ranked: &[Ranked]) -> Vec<usize> {
    ranked.iter().map(|r| r.rank.0).collect()
}

// ─── Leaderboard scenarios ───────────────────────────────────────────────────

fn scenario_engine() -> RankedEngine {
    let (t0, t1) = (Timestamp(10), Timestamp(11));
    RankedEngine::from_entries_with_config(
        EngineConfig::default().bucket_capacity(4),
        [Entry::new(1, 100, t0), Entry::new(2, 100, t1), Entry::new(3, 50, t0)],
    )
    .unwrap()
}

#[test]
fn recency_breaks_score_ties() {
    let engine = scenario_engine();
    assert_eq!(rank(&engine, 2), Some(Rank(1)));
    assert_eq!(rank(&engine, 1), Some(Rank(2)));
    assert_eq!(rank(&engine, 3), Some(Rank(3)));
}

#[test]
fn new_leader_shifts_everyone_down() {
    let mut engine = scenario_engine();
    assert_eq!(engine.add(Entry::new(4, 200, Timestamp(12))), Ok(Rank(1)));
    assert_eq!(rank(&engine, 4), Some(Rank(1)));
    assert_eq!(rank(&engine, 2), Some(Rank(2)));
    assert_eq!(rank(&engine, 1), Some(Rank(3)));
    assert_eq!(rank(&engine, 3), Some(Rank(4)));
}

#[test]
fn update_moves_entry_to_the_top() {
    let mut engine = scenario_engine();
    engine.add(Entry::new(4, 200, Timestamp(12))).unwrap();
    assert_eq!(engine.update(Entry::new(3, 500, Timestamp(13))), Ok(Rank(1)));
    assert_eq!(ids(&engine.top_n(4)), [3, 4, 2, 1]);
    assert_eq!(engine.get(3), Some(&Entry::new(3, 500, Timestamp(13))));
}

#[test]
fn removed_entry_is_no_longer_ranked() {
    let mut engine = scenario_engine();
    let before = engine.count();
    assert_eq!(engine.remove(1).map(|e| e.id), Ok(1));
    assert_eq!(engine.count(), before - 1);
    assert_eq!(engine.rank_of(1), None);
    assert_eq!(engine.remove(1), Err(RankError::NotFound(1)));
    assert_eq!(engine.around(1, 2), Err(RankError::NotFound(1)));
}

#[test]
fn ranks_stay_correct_across_a_split() {
    let mut engine = small_engine();
    for (id, score) in [(1, 40), (2, 30), (3, 20), (4, 10)] {
        engine.add(Entry::new(id, score, Timestamp(0))).unwrap();
    }
    assert_eq!(engine.add(Entry::new(5, 25, Timestamp(0))), Ok(Rank(3)));

    assert_eq!(ids(&engine.top_n(5)), [1, 2, 5, 3, 4]);
    for (position, id) in [1, 2, 5, 3, 4].into_iter().enumerate() {
        assert_eq!(rank(&engine, id), Some(Rank(position + 1)));
    }
    assert_eq!(engine.check_invariants(), Ok(()));
}

#[test]
fn around_returns_the_window_clipped_at_the_edges() {
    let mut engine = small_engine();
    // Rank equals id.
    for id in 1..=10u64 {
        engine.add(Entry::new(id, 100 - id as i64, Timestamp(0))).unwrap();
    }
    assert_eq!(ranks(&engine.around(5, 2).unwrap()), [3, 4, 5, 6, 7]);
    assert_eq!(ranks(&engine.around(1, 2).unwrap()), [1, 2, 3]);
    assert_eq!(ranks(&engine.around(10, 2).unwrap()), [8, 9, 10]);
}

// ─── Boundaries ──────────────────────────────────────────────────────────────

#[test]
fn empty_engine_queries_are_not_errors() {
    let engine = small_engine();
    assert!(engine.top_n(0).is_empty());
    assert!(engine.top_n(10).is_empty());
    assert_eq!(engine.around(7, 3), Ok(Vec::new()));
    assert_eq!(engine.rank_of(7), None);
    assert_eq!(engine.count(), 0);
}

#[test]
fn top_n_past_the_end_returns_everything() {
    let engine = RankedEngine::from_entries((0..50).map(|id| Entry::new(id, 0, Timestamp(id)))).unwrap();
    let all = engine.top_n(1_000);
    assert_eq!(all.len(), 50);
    assert_eq!(all, engine.iter().collect::<Vec<_>>());
}

#[test]
fn exact_ties_order_by_id() {
    let mut engine = small_engine();
    for id in [9, 3, 7, 1, 5] {
        engine.add(Entry::new(id, 10, Timestamp(0))).unwrap();
    }
    assert_eq!(ids(&engine.top_n(5)), [1, 3, 5, 7, 9]);
}

#[test]
fn standings_combine_three_queries() {
    let engine = RankedEngine::from_entries((1..=30).map(|id| Entry::new(id, -(id as i64), Timestamp(0)))).unwrap();
    let view = engine.standings(5, 20, 2);
    assert_eq!(view.total, 30);
    assert_eq!(view.top, engine.top_n(5));
    assert_eq!(view.around, Some(engine.around(20, 2).unwrap()));
}

// ─── Properties against the sorted-vector oracle ─────────────────────────────

#[derive(Debug, Clone)]
enum RankOp {
    Add(u64, i64, u64),
    Update(u64, i64, u64),
    Upsert(u64, i64, u64),
    Remove(u64),
    RankOf(u64),
    TopN(usize),
    Around(u64, usize),
}

fn id_strategy() -> impl Strategy<Value = u64> {
    // Small enough to collide often.
    0u64..500
}

fn score_strategy() -> impl Strategy<Value = i64> {
    -50i64..50
}

fn time_strategy() -> impl Strategy<Value = u64> {
    0u64..8
}

fn rank_op_strategy() -> impl Strategy<Value = RankOp> {
    prop_oneof![
        6 => (id_strategy(), score_strategy(), time_strategy()).prop_map(|(i, s, t)| RankOp::Add(i, s, t)),
        3 => (id_strategy(), score_strategy(), time_strategy()).prop_map(|(i, s, t)| RankOp::Update(i, s, t)),
        1 => (id_strategy(), score_strategy(), time_strategy()).prop_map(|(i, s, t)| RankOp::Upsert(i, s, t)),
        3 => id_strategy().prop_map(RankOp::Remove),
        2 => id_strategy().prop_map(RankOp::RankOf),
        1 => (0usize..40).prop_map(RankOp::TopN),
        2 => (id_strategy(), 0usize..12).prop_map(|(i, k)| RankOp::Around(i, k)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Replays a random operation sequence on the engine and the sorted-vector oracle
    /// and asserts identical results and a healthy structure at every step.
    #[test]
    fn engine_matches_sorted_vec(
        capacity in 4usize..16,
        ops in proptest::collection::vec(rank_op_strategy(), TEST_SIZE),
    ) {
        let mut engine = RankedEngine::with_config(EngineConfig::default().bucket_capacity(capacity)).unwrap();
        let mut oracle = SortedVecRanking::new();

        for op in ops {
            match op {
                RankOp::Add(id, score, time) => {
                    let entry = Entry::new(id, score, Timestamp(time));
                    prop_assert_eq!(engine.add(entry), oracle.add(entry));
                }
                RankOp::Update(id, score, time) => {
                    let entry = Entry::new(id, score, Timestamp(time));
                    prop_assert_eq!(engine.update(entry), oracle.update(entry));
                }
                RankOp::Upsert(id, score, time) => {
                    let entry = Entry::new(id, score, Timestamp(time));
                    prop_assert_eq!(engine.upsert(entry), oracle.upsert(entry));
                }
                RankOp::Remove(id) => {
                    prop_assert_eq!(engine.remove(id), oracle.remove(id));
                }
                RankOp::RankOf(id) => {
                    prop_assert_eq!(engine.rank_of(id), oracle.rank_of(id));
                }
                RankOp::TopN(n) => {
                    prop_assert_eq!(engine.top_n(n), oracle.top_n(n));
                }
                RankOp::Around(id, k) => {
                    prop_assert_eq!(engine.around(id, k), oracle.around(id, k));
                }
            }
            prop_assert_eq!(engine.count(), oracle.count());
            prop_assert_eq!(engine.check_invariants(), Ok(()));
        }
    }

    /// Adding an entry and removing it again restores every other rank.
    #[test]
    fn add_then_remove_round_trips(
        entries in proptest::collection::btree_map(id_strategy(), (score_strategy(), time_strategy()), 1..300),
        extra in (score_strategy(), time_strategy()),
    ) {
        let entries: Vec<Entry> = entries.into_iter().map(|(id, (s, t))| Entry::new(id, s, Timestamp(t))).collect();
        let mut engine = RankedEngine::from_entries_with_config(
            EngineConfig::default().bucket_capacity(6),
            entries.iter().copied(),
        )
        .unwrap();
        let before: Vec<Ranked> = engine.iter().collect();

        let newcomer = Entry::new(10_000, extra.0, Timestamp(extra.1));
        engine.add(newcomer).unwrap();
        prop_assert_eq!(engine.remove(newcomer.id), Ok(newcomer));

        prop_assert_eq!(engine.count(), entries.len());
        for ranked in &before {
            prop_assert_eq!(engine.rank_of(ranked.entry.id), Some(*ranked));
        }
        prop_assert_eq!(engine.check_invariants(), Ok(()));
    }

    /// Reads without intervening mutations return identical results.
    #[test]
    fn reads_are_repeatable(
        ids in proptest::collection::vec(id_strategy(), 1..300),
        n in 0usize..400,
        k in 0usize..20,
    ) {
        let mut engine = small_engine();
        for (i, id) in ids.iter().enumerate() {
            engine.upsert(Entry::new(*id, (i % 13) as i64, Timestamp(0)));
        }
        let probe = ids[ids.len() / 2];

        prop_assert_eq!(engine.top_n(n), engine.top_n(n));
        prop_assert_eq!(engine.around(probe, k), engine.around(probe, k));
    }

    /// Every rank reported by `rank_of` matches the entry's position in the iteration.
    #[test]
    fn rank_of_agrees_with_iteration(
        entries in proptest::collection::btree_map(id_strategy(), (score_strategy(), time_strategy()), 0..400),
    ) {
        let engine = RankedEngine::from_entries_with_config(
            EngineConfig::default().bucket_capacity(5),
            entries.into_iter().map(|(id, (s, t))| Entry::new(id, s, Timestamp(t))),
        )
        .unwrap();

        for (position, ranked) in engine.iter().enumerate() {
            prop_assert_eq!(ranked.rank, Rank(position + 1));
            prop_assert_eq!(engine.rank_of(ranked.entry.id), Some(ranked));
            prop_assert_eq!(engine.get_by_rank(ranked.rank), Some(ranked));
        }
        prop_assert!(engine.iter().map(|r| r.entry).is_sorted());
    }
}
