//! Run builder
//!
//! Produces the ordered question list for one game. Two modes:
//! - explicit difficulty filter: filter, shuffle, truncate
//! - balanced: blocks of ten with one attempt per difficulty tier (falling back
//!   to easier tiers) plus random filler, each block shuffled on its own

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use crate::bank::QuestionBank;
use crate::types::{Difficulty, Question, Run, RunSpec};

/// Questions per balanced block
pub const BLOCK_SIZE: usize = 10;

type Buckets = [Vec<Question>; 4];

/// Build a run from the bank. Never fails: an exhausted pool yields a shorter run.
pub fn build_run<R: Rng + ?Sized>(bank: &QuestionBank, spec: &RunSpec, rng: &mut R) -> Run {
    let pool: Vec<Question> = bank
        .pool(spec.theme.as_deref())
        .into_iter()
        .cloned()
        .collect();

    let run = match &spec.difficulties {
        Some(difficulties) => filtered_run(pool, difficulties, spec.count, rng),
        None => balanced_run(pool, spec.count, rng),
    };

    tracing::debug!(
        "Built run of {} question(s) (theme={:?}, difficulties={:?}, count={:?})",
        run.len(),
        spec.theme,
        spec.difficulties,
        spec.count
    );
    run
}

fn filtered_run<R: Rng + ?Sized>(
    pool: Vec<Question>,
    difficulties: &BTreeSet<Difficulty>,
    count: Option<usize>,
    rng: &mut R,
) -> Run {
    let mut filtered: Vec<Question> = pool
        .into_iter()
        .filter(|q| difficulties.contains(&q.difficulty))
        .collect();
    filtered.shuffle(rng);
    if let Some(count) = count {
        filtered.truncate(count);
    }
    filtered
}

fn balanced_run<R: Rng + ?Sized>(pool: Vec<Question>, count: Option<usize>, rng: &mut R) -> Run {
    let count = count.unwrap_or(pool.len());

    let mut buckets: Buckets = Default::default();
    for question in pool {
        buckets[question.difficulty.rank()].push(question);
    }

    let mut run = Vec::with_capacity(count);

    for _ in 0..count / BLOCK_SIZE {
        if buckets.iter().all(Vec::is_empty) {
            break;
        }

        let mut block = Vec::with_capacity(BLOCK_SIZE);
        for tier in Difficulty::ALL {
            if let Some(question) = pop_with_fallback(&mut buckets, tier, rng) {
                block.push(question);
            }
        }
        while block.len() < BLOCK_SIZE {
            match pop_any(&mut buckets, rng) {
                Some(question) => block.push(question),
                None => break,
            }
        }

        block.shuffle(rng);
        run.extend(block);
    }

    while run.len() < count {
        match pop_any(&mut buckets, rng) {
            Some(question) => run.push(question),
            None => break,
        }
    }

    run
}

/// Pop a random question of `tier`, stepping down to easier tiers when empty
fn pop_with_fallback<R: Rng + ?Sized>(
    buckets: &mut Buckets,
    tier: Difficulty,
    rng: &mut R,
) -> Option<Question> {
    (0..=tier.rank()).rev().find_map(|rank| {
        let bucket = &mut buckets[rank];
        if bucket.is_empty() {
            None
        } else {
            let idx = rng.random_range(0..bucket.len());
            Some(bucket.swap_remove(idx))
        }
    })
}

/// Pop a question drawn uniformly from everything left in the buckets
fn pop_any<R: Rng + ?Sized>(buckets: &mut Buckets, rng: &mut R) -> Option<Question> {
    let total: usize = buckets.iter().map(Vec::len).sum();
    if total == 0 {
        return None;
    }

    let mut idx = rng.random_range(0..total);
    for bucket in buckets.iter_mut() {
        if idx < bucket.len() {
            return Some(bucket.swap_remove(idx));
        }
        idx -= bucket.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn question(theme: &str, difficulty: Difficulty, n: usize) -> Question {
        Question {
            text: format!("{} {:?} #{}", theme, difficulty, n),
            options: vec!["right".to_string(), "wrong".to_string(), "nope".to_string()],
            answer: "right".to_string(),
            difficulty,
            theme: theme.to_string(),
        }
    }

    /// `per_tier[i]` questions of tier i for the theme
    fn bank_with(theme: &str, per_tier: [usize; 4]) -> QuestionBank {
        let questions = Difficulty::ALL
            .into_iter()
            .zip(per_tier)
            .flat_map(|(d, n)| (0..n).map(move |i| question(theme, d, i)));
        QuestionBank::from_questions(questions)
    }

    fn texts(run: &Run) -> HashSet<&str> {
        run.iter().map(|q| q.text.as_str()).collect()
    }

    #[test]
    fn test_filtered_mode_respects_difficulties() {
        let bank = bank_with("Friends", [6, 5, 4, 3]);
        let mut rng = StdRng::seed_from_u64(1);
        let wanted = BTreeSet::from([Difficulty::Hard, Difficulty::Expert]);

        let spec = RunSpec {
            theme: Some("Friends".to_string()),
            difficulties: Some(wanted.clone()),
            count: Some(5),
        };
        let run = build_run(&bank, &spec, &mut rng);
        assert_eq!(run.len(), 5);
        assert!(run.iter().all(|q| wanted.contains(&q.difficulty)));

        // Asking for more than the pool holds returns every match
        let spec = RunSpec {
            count: Some(50),
            ..spec
        };
        let run = build_run(&bank, &spec, &mut rng);
        assert_eq!(run.len(), 7);
        assert_eq!(texts(&run).len(), 7);
    }

    #[test]
    fn test_filtered_mode_without_count_returns_all_matches() {
        let bank = bank_with("Naruto", [3, 2, 0, 0]);
        let mut rng = StdRng::seed_from_u64(2);
        let spec = RunSpec {
            theme: Some("Naruto".to_string()),
            difficulties: Some(BTreeSet::from([Difficulty::Medium])),
            count: None,
        };

        let run = build_run(&bank, &spec, &mut rng);
        assert_eq!(run.len(), 2);
        assert!(run.iter().all(|q| q.difficulty == Difficulty::Medium));
    }

    #[test]
    fn test_balanced_blocks_cover_every_tier() {
        let bank = bank_with("Friends", [10, 10, 10, 10]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let spec = RunSpec {
                theme: Some("Friends".to_string()),
                difficulties: None,
                count: Some(20),
            };
            let run = build_run(&bank, &spec, &mut rng);
            assert_eq!(run.len(), 20);
            assert_eq!(texts(&run).len(), 20);

            for block in run.chunks(BLOCK_SIZE) {
                let tiers: HashSet<Difficulty> = block.iter().map(|q| q.difficulty).collect();
                assert_eq!(tiers.len(), 4, "seed {} block missing a tier", seed);
            }
        }
    }

    #[test]
    fn test_friends_scenario_ten_questions() {
        let bank = bank_with("Friends", [8, 8, 8, 8]);
        let mut rng = StdRng::seed_from_u64(42);
        let spec = RunSpec {
            theme: Some("Friends".to_string()),
            difficulties: None,
            count: Some(10),
        };

        let run = build_run(&bank, &spec, &mut rng);
        assert_eq!(run.len(), 10);
        assert_eq!(texts(&run).len(), 10);
        assert!(run.iter().all(|q| q.theme == "Friends"));
        let tiers: HashSet<Difficulty> = run.iter().map(|q| q.difficulty).collect();
        assert_eq!(tiers.len(), 4);
    }

    #[test]
    fn test_missing_tier_falls_back_to_easier() {
        // No expert questions: the expert slot must be filled from hard
        let bank = bank_with("Office", [10, 10, 10, 0]);

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let spec = RunSpec {
                theme: Some("Office".to_string()),
                difficulties: None,
                count: Some(10),
            };
            let run = build_run(&bank, &spec, &mut rng);
            assert_eq!(run.len(), 10);
            let hard = run.iter().filter(|q| q.difficulty == Difficulty::Hard).count();
            assert!(hard >= 2, "seed {}: expected fallback into hard", seed);
        }
    }

    #[test]
    fn test_only_easy_questions() {
        let bank = bank_with("Avengers", [12, 0, 0, 0]);
        let mut rng = StdRng::seed_from_u64(3);
        let spec = RunSpec {
            theme: Some("Avengers".to_string()),
            difficulties: None,
            count: Some(10),
        };

        let run = build_run(&bank, &spec, &mut rng);
        assert_eq!(run.len(), 10);
        assert!(run.iter().all(|q| q.difficulty == Difficulty::Easy));
    }

    #[test]
    fn test_exhausted_pool_gives_shorter_run() {
        let bank = bank_with("TBBT", [2, 2, 2, 1]);
        let mut rng = StdRng::seed_from_u64(4);
        let spec = RunSpec {
            theme: Some("TBBT".to_string()),
            difficulties: None,
            count: Some(20),
        };

        let run = build_run(&bank, &spec, &mut rng);
        assert_eq!(run.len(), 7);
        assert_eq!(texts(&run).len(), 7);
    }

    #[test]
    fn test_partial_block_tops_up_remainder() {
        let bank = bank_with("Friends", [10, 10, 10, 10]);
        let mut rng = StdRng::seed_from_u64(5);
        let spec = RunSpec {
            theme: Some("Friends".to_string()),
            difficulties: None,
            count: Some(25),
        };

        let run = build_run(&bank, &spec, &mut rng);
        assert_eq!(run.len(), 25);
        assert_eq!(texts(&run).len(), 25);
    }

    #[test]
    fn test_default_count_uses_whole_pool() {
        let bank = bank_with("Friends", [5, 7, 3, 9]);
        let mut rng = StdRng::seed_from_u64(6);
        let run = build_run(
            &bank,
            &RunSpec {
                theme: Some("Friends".to_string()),
                ..RunSpec::default()
            },
            &mut rng,
        );
        assert_eq!(run.len(), 24);
        assert_eq!(texts(&run).len(), 24);
    }

    #[test]
    fn test_no_theme_draws_from_all_themes() {
        let mut questions: Vec<Question> = (0..5)
            .map(|i| question("Friends", Difficulty::Easy, i))
            .collect();
        questions.extend((0..5).map(|i| question("Naruto", Difficulty::Hard, i)));
        let bank = QuestionBank::from_questions(questions);
        let mut rng = StdRng::seed_from_u64(8);

        let run = build_run(&bank, &RunSpec::default(), &mut rng);
        assert_eq!(run.len(), 10);
        let themes: HashSet<&str> = run.iter().map(|q| q.theme.as_str()).collect();
        assert_eq!(themes.len(), 2);
    }

    #[test]
    fn test_unknown_theme_is_empty() {
        let bank = bank_with("Friends", [3, 3, 3, 3]);
        let mut rng = StdRng::seed_from_u64(9);
        let spec = RunSpec {
            theme: Some("Lost".to_string()),
            difficulties: None,
            count: Some(10),
        };
        assert!(build_run(&bank, &spec, &mut rng).is_empty());
    }
}
