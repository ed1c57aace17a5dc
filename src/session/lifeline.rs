//! Lifelines: 50:50 and Call-a-Friend
//!
//! A lifeline is usable when the unlimited perk is active, when it has not been
//! used yet, or when the player holds a matching unconsumed voucher. The caller
//! resolves the grant first (and consumes the voucher when that is the source),
//! then applies the lifeline here.

use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use super::{Phase, Session, SessionEvent};
use crate::bank::FriendTemplates;
use crate::error::{QuizError, QuizResult};
use crate::types::{Lifeline, LifelineAvailability, VoucherKind, VoucherRecord};

/// Where the right to use a lifeline came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// Unlimited-lifelines perk, nothing consumed
    Unlimited,
    /// First use this run (or restored by a streak)
    Unused,
    /// A lifeline voucher, which the caller must consume
    Voucher,
}

fn voucher_covers(voucher: Option<&VoucherRecord>, lifeline: Lifeline) -> bool {
    voucher.is_some_and(|v| v.kind == VoucherKind::from(lifeline) && !v.consumed)
}

impl Session {
    pub fn lifeline_used(&self, lifeline: Lifeline) -> bool {
        match lifeline {
            Lifeline::Fifty => self.fifty_used,
            Lifeline::Call => self.call_used,
        }
    }

    /// Resolve which grant (if any) allows using `lifeline` right now
    pub fn lifeline_grant(&self, lifeline: Lifeline, voucher: Option<&VoucherRecord>) -> Option<Grant> {
        if self.perks.unlimited_lifelines {
            Some(Grant::Unlimited)
        } else if !self.lifeline_used(lifeline) {
            Some(Grant::Unused)
        } else if voucher_covers(voucher, lifeline) {
            Some(Grant::Voucher)
        } else {
            None
        }
    }

    /// Button state for both lifelines
    pub fn lifeline_availability(&self, voucher: Option<&VoucherRecord>) -> LifelineAvailability {
        LifelineAvailability {
            fifty: self.lifeline_grant(Lifeline::Fifty, voucher).is_some(),
            call: self.lifeline_grant(Lifeline::Call, voucher).is_some(),
        }
    }

    /// Check the phase and question preconditions of a lifeline before any grant is spent
    pub fn ensure_lifeline_applicable(&self, lifeline: Lifeline) -> QuizResult<()> {
        let Phase::AwaitingAnswer { index } = self.phase else {
            return Err(self.invalid(match lifeline {
                Lifeline::Fifty => "use 50:50",
                Lifeline::Call => "call a friend",
            }));
        };
        if lifeline == Lifeline::Fifty && self.run[index].options.len() <= 2 {
            return Err(QuizError::InsufficientOptions);
        }
        Ok(())
    }

    /// Reduce the presented options to the answer plus one random wrong option
    pub fn use_fifty(&mut self, grant: Grant) -> QuizResult<SessionEvent> {
        self.ensure_lifeline_applicable(Lifeline::Fifty)?;
        let question = &self.run[self.index];

        let wrong: Vec<&String> = question
            .options
            .iter()
            .filter(|o| **o != question.answer)
            .collect();
        let mut reduced = Vec::with_capacity(2);
        if let Some(decoy) = wrong.choose(&mut self.rng) {
            reduced.push((*decoy).clone());
        }
        reduced.push(question.answer.clone());
        reduced.shuffle(&mut self.rng);

        self.presented = reduced.clone();
        self.fifty_used = true;
        let streak_broken = self.streak_active;
        self.streak_active = false;
        self.streak_score = 0;

        tracing::debug!("50:50 used via {:?} (streak broken: {})", grant, streak_broken);
        Ok(SessionEvent::FiftyUsed {
            options: reduced,
            streak_broken,
        })
    }

    /// Reveal the answer through a themed character
    pub fn use_call(&mut self, grant: Grant, templates: &FriendTemplates) -> QuizResult<SessionEvent> {
        self.ensure_lifeline_applicable(Lifeline::Call)?;
        let question = &self.run[self.index];
        let hint = templates.hint(&question.theme, &question.answer, &mut self.rng);

        self.call_used = true;

        tracing::debug!("Call-a-Friend used via {:?}", grant);
        Ok(SessionEvent::FriendCalled { hint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{answer_right, question, run_of, session};
    use crate::types::{Difficulty, Perks};

    fn voucher(kind: VoucherKind, consumed: bool) -> VoucherRecord {
        VoucherRecord {
            code: "CODE1".to_string(),
            kind,
            consumed,
        }
    }

    #[test]
    fn test_fifty_reduces_to_two_options() {
        let mut s = session(run_of(2, Difficulty::Easy), Perks::default());

        let event = s.use_fifty(Grant::Unused).unwrap();
        let SessionEvent::FiftyUsed { options, streak_broken } = event else {
            panic!("Expected FiftyUsed");
        };
        assert_eq!(options.len(), 2);
        assert!(options.contains(&"A".to_string()));
        assert!(!streak_broken);
        assert_eq!(s.presented_options(), options.as_slice());
        assert!(s.fifty_used());

        // The question record itself is untouched
        assert_eq!(s.current_question().unwrap().options.len(), 4);
    }

    #[test]
    fn test_fifty_with_two_options_is_rejected() {
        let run = vec![question("Yes or no?", Difficulty::Easy, &["Yes", "No"])];
        let mut s = session(run, Perks::default());

        let result = s.use_fifty(Grant::Unused);
        assert!(matches!(result, Err(QuizError::InsufficientOptions)));
        assert_eq!(result.unwrap_err().to_string(), "Not enough options");
        assert!(!s.fifty_used());
        assert_eq!(s.presented_options().len(), 2);
    }

    #[test]
    fn test_grant_precedence() {
        let mut s = session(run_of(3, Difficulty::Easy), Perks::default());
        assert_eq!(s.lifeline_grant(Lifeline::Fifty, None), Some(Grant::Unused));

        s.use_fifty(Grant::Unused).unwrap();
        assert_eq!(s.lifeline_grant(Lifeline::Fifty, None), None);

        let fifty = voucher(VoucherKind::Fifty, false);
        assert_eq!(
            s.lifeline_grant(Lifeline::Fifty, Some(&fifty)),
            Some(Grant::Voucher)
        );

        // Wrong kind or already consumed does not help
        let call = voucher(VoucherKind::Call, false);
        assert_eq!(s.lifeline_grant(Lifeline::Fifty, Some(&call)), None);
        let spent = voucher(VoucherKind::Fifty, true);
        assert_eq!(s.lifeline_grant(Lifeline::Fifty, Some(&spent)), None);

        let unlimited = session(
            run_of(1, Difficulty::Easy),
            Perks {
                unlimited_lifelines: true,
                ..Perks::default()
            },
        );
        assert_eq!(
            unlimited.lifeline_grant(Lifeline::Call, None),
            Some(Grant::Unlimited)
        );
    }

    #[test]
    fn test_availability_tracks_used_flags() {
        let mut s = session(run_of(3, Difficulty::Easy), Perks::default());
        assert_eq!(
            s.lifeline_availability(None),
            LifelineAvailability {
                fifty: true,
                call: true
            }
        );

        s.use_call(Grant::Unused, &FriendTemplates::default()).unwrap();
        assert_eq!(
            s.lifeline_availability(None),
            LifelineAvailability {
                fifty: true,
                call: false
            }
        );

        let call = voucher(VoucherKind::Call, false);
        assert!(s.lifeline_availability(Some(&call)).call);
    }

    #[test]
    fn test_call_reveals_answer_without_touching_streak() {
        let mut s = session(run_of(1, Difficulty::Easy), Perks::default());

        let event = s.use_call(Grant::Unused, &FriendTemplates::default()).unwrap();
        let SessionEvent::FriendCalled { hint } = event else {
            panic!("Expected FriendCalled");
        };
        assert!(hint.contains('A'));
        assert!(s.call_used());
        assert!(!s.fifty_used());
        assert_eq!(s.phase(), Phase::AwaitingAnswer { index: 0 });
    }

    #[test]
    fn test_lifelines_only_while_awaiting_answer() {
        let mut s = session(run_of(2, Difficulty::Easy), Perks::default());
        s.submit_answer(Some("A")).unwrap();

        assert!(matches!(
            s.use_fifty(Grant::Unused),
            Err(QuizError::InvalidTransition { .. })
        ));
        assert!(matches!(
            s.use_call(Grant::Unused, &FriendTemplates::default()),
            Err(QuizError::InvalidTransition { .. })
        ));
        assert!(!s.fifty_used());
        assert!(!s.call_used());
    }

    #[test]
    fn test_streak_starts_only_after_both_lifelines_used() {
        let mut s = session(run_of(10, Difficulty::Expert), Perks::default());

        answer_right(&mut s);
        assert!(!s.streak_active());

        s.use_fifty(Grant::Unused).unwrap();
        s.use_call(Grant::Unused, &FriendTemplates::default()).unwrap();
        // The answer that starts the streak does not count towards it
        answer_right(&mut s);
        assert!(s.streak_active());
        assert_eq!(s.streak_score(), 0);

        answer_right(&mut s);
        assert_eq!(s.streak_score(), 4);
    }

    #[test]
    fn test_fifty_restored_exactly_at_crossing() {
        let mut s = session(run_of(20, Difficulty::Expert), Perks::default());
        s.use_fifty(Grant::Unused).unwrap();
        s.use_call(Grant::Unused, &FriendTemplates::default()).unwrap();

        // Starts the streak at 0
        answer_right(&mut s);
        assert!(s.streak_active());

        // 4 points per answer: 4, 8, ..., 24 keep 50:50 locked
        for _ in 0..6 {
            let event = answer_right(&mut s);
            assert!(matches!(
                event,
                SessionEvent::AnswerResolved { ref restored, .. } if restored.is_empty()
            ));
            assert!(s.fifty_used());
        }
        assert_eq!(s.streak_score(), 24);

        // 28 crosses the threshold
        let event = answer_right(&mut s);
        assert!(matches!(
            event,
            SessionEvent::AnswerResolved { ref restored, .. } if restored == &vec![Lifeline::Fifty]
        ));
        assert!(!s.fifty_used());
        assert!(s.call_used());
        assert!(s.streak_active());
        assert_eq!(s.streak_score(), 28);

        // Only once
        let event = answer_right(&mut s);
        assert!(matches!(
            event,
            SessionEvent::AnswerResolved { ref restored, .. } if restored.is_empty()
        ));
    }

    #[test]
    fn test_call_restore_ends_streak_when_both_back() {
        let mut s = session(run_of(30, Difficulty::Expert), Perks::default());
        s.use_fifty(Grant::Unused).unwrap();
        s.use_call(Grant::Unused, &FriendTemplates::default()).unwrap();
        answer_right(&mut s);

        // 12 answers x 4 = 48: fifty restored at 28, call still locked
        for _ in 0..12 {
            answer_right(&mut s);
        }
        assert!(!s.fifty_used());
        assert!(s.call_used());
        assert_eq!(s.streak_score(), 48);

        let event = answer_right(&mut s);
        assert!(matches!(
            event,
            SessionEvent::AnswerResolved { ref restored, .. } if restored == &vec![Lifeline::Call]
        ));
        assert!(!s.call_used());
        assert!(!s.streak_active());
        assert_eq!(s.streak_score(), 0);
    }

    #[test]
    fn test_fifty_breaks_active_streak() {
        let perks = Perks {
            unlimited_lifelines: true,
            ..Perks::default()
        };
        let mut s = session(run_of(10, Difficulty::Medium), perks);
        s.use_fifty(Grant::Unlimited).unwrap();
        s.use_call(Grant::Unlimited, &FriendTemplates::default()).unwrap();
        answer_right(&mut s);
        answer_right(&mut s);
        assert!(s.streak_active());
        assert_eq!(s.streak_score(), 2);

        let event = s.use_fifty(Grant::Unlimited).unwrap();
        assert!(matches!(
            event,
            SessionEvent::FiftyUsed {
                streak_broken: true,
                ..
            }
        ));
        assert!(!s.streak_active());
        assert_eq!(s.streak_score(), 0);
    }

    #[test]
    fn test_wrong_answer_resets_streak() {
        let mut s = session(run_of(5, Difficulty::Hard), Perks::default());
        s.use_fifty(Grant::Unused).unwrap();
        s.use_call(Grant::Unused, &FriendTemplates::default()).unwrap();
        answer_right(&mut s);
        answer_right(&mut s);
        assert_eq!(s.streak_score(), 3);

        s.submit_answer(Some("B")).unwrap();
        assert!(!s.streak_active());
        assert_eq!(s.streak_score(), 0);
    }
}
