use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque ID types for readability
pub type PlayerId = String;
pub type ThemeName = String;
pub type VoucherCode = String;

/// Difficulty tier of a question, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// All tiers, easiest first
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Normalise a raw difficulty label. Missing or unknown labels count as easy.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("medium") => Difficulty::Medium,
            Some("hard") => Difficulty::Hard,
            Some("expert") => Difficulty::Expert,
            _ => Difficulty::Easy,
        }
    }

    /// Points awarded for a correct answer
    pub fn points(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Expert => 4,
        }
    }

    /// Position in the easy→expert ordering
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Capitalised label shown next to the question
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }
}

/// A single multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub answer: String,
    pub difficulty: Difficulty,
    pub theme: ThemeName,
}

impl Question {
    pub fn is_correct(&self, selected: &str) -> bool {
        self.answer == selected
    }
}

/// Parameters for building a run of questions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSpec {
    /// None draws from every theme
    pub theme: Option<ThemeName>,
    /// None selects balanced block mode
    pub difficulties: Option<BTreeSet<Difficulty>>,
    /// None means "as many as the pool allows"
    pub count: Option<usize>,
}

/// An ordered sequence of questions, fixed once built
pub type Run = Vec<Question>;

/// Difficulty mode picked on the mode selection screen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Easy,
    Hard,
    Mixed,
}

impl GameMode {
    /// Translate the mode into a run spec for the given theme
    pub fn run_spec(self, theme: Option<ThemeName>) -> RunSpec {
        let difficulties = match self {
            GameMode::Easy => Some(BTreeSet::from([Difficulty::Easy, Difficulty::Medium])),
            GameMode::Hard => Some(BTreeSet::from([Difficulty::Hard, Difficulty::Expert])),
            GameMode::Mixed => None,
        };
        RunSpec {
            theme,
            difficulties,
            count: None,
        }
    }
}

/// The two lifelines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Lifeline {
    Fifty,
    Call,
}

impl fmt::Display for Lifeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifeline::Fifty => write!(f, "50:50"),
            Lifeline::Call => write!(f, "Call-a-Friend"),
        }
    }
}

/// Run-level modifiers bought in the shop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Perk {
    /// Reveal the answer when ten seconds remain
    Early,
    /// Lifelines never run out
    Unlimited,
    /// No countdown for the run
    Disable,
}

impl Perk {
    pub fn display_name(self) -> &'static str {
        match self {
            Perk::Early => "Early-Reveal",
            Perk::Unlimited => "Unlimited Lifelines",
            Perk::Disable => "Disable Timer",
        }
    }
}

/// Perks active for one run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Perks {
    pub early_reveal: bool,
    pub unlimited_lifelines: bool,
    pub disable_timer: bool,
}

impl Perks {
    pub fn grant(&mut self, perk: Perk) {
        match perk {
            Perk::Early => self.early_reveal = true,
            Perk::Unlimited => self.unlimited_lifelines = true,
            Perk::Disable => self.disable_timer = true,
        }
    }
}

/// Voucher kind as stored in the voucher file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoucherKind {
    Early,
    Unlimited,
    Disable,
    Fifty,
    Call,
}

impl VoucherKind {
    /// Parse a stored `type` label, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "early" => Some(VoucherKind::Early),
            "unlimited" => Some(VoucherKind::Unlimited),
            "disable" => Some(VoucherKind::Disable),
            "fifty" => Some(VoucherKind::Fifty),
            "call" => Some(VoucherKind::Call),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoucherKind::Early => "early",
            VoucherKind::Unlimited => "unlimited",
            VoucherKind::Disable => "disable",
            VoucherKind::Fifty => "fifty",
            VoucherKind::Call => "call",
        }
    }

    /// What redeeming a voucher of this kind grants
    pub fn redemption(self) -> Redemption {
        match self {
            VoucherKind::Early => Redemption::Perk(Perk::Early),
            VoucherKind::Unlimited => Redemption::Perk(Perk::Unlimited),
            VoucherKind::Disable => Redemption::Perk(Perk::Disable),
            VoucherKind::Fifty => Redemption::Lifeline(Lifeline::Fifty),
            VoucherKind::Call => Redemption::Lifeline(Lifeline::Call),
        }
    }
}

impl From<Lifeline> for VoucherKind {
    fn from(lifeline: Lifeline) -> Self {
        match lifeline {
            Lifeline::Fifty => VoucherKind::Fifty,
            Lifeline::Call => VoucherKind::Call,
        }
    }
}

/// A voucher together with its code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoucherRecord {
    pub code: VoucherCode,
    pub kind: VoucherKind,
    pub consumed: bool,
}

/// What a successful redemption granted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Redemption {
    Perk(Perk),
    Lifeline(Lifeline),
}

impl fmt::Display for Redemption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redemption::Perk(perk) => write!(f, "{}", perk.display_name()),
            Redemption::Lifeline(lifeline) => write!(f, "{}", lifeline),
        }
    }
}

/// One row of the leaderboard view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub nickname: String,
    pub score: u32,
}

/// Whether each lifeline button is enabled
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifelineAvailability {
    pub fifty: bool,
    pub call: bool,
}
