//! Call-a-Friend hint templates per theme

use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;

const FALLBACK: (&str, &str) = ("Friend", "I think it's {answer}.");

const BUILTIN: &[(&str, &[(&str, &str)])] = &[
    (
        "Friends",
        &[
            ("Chandler", "Could it *be* any more obvious? The answer is {answer}."),
            ("Joey", "How you doin'? The answer is {answer}."),
            ("Monica", "I've cleaned the data: the answer is {answer}."),
            ("Ross", "Pivot! The answer is {answer}."),
            ("Phoebe", "Smelly cat, smelly cat, the answer's {answer}."),
        ],
    ),
    (
        "The Big Bang Theory",
        &[
            ("Sheldon Cooper", "Bazinga! Of course the answer is {answer}."),
            ("Leonard Hofstadter", "According to my calculations, the answer is {answer}."),
            ("Howard Wolowitz", "In zero-G or on Earth, only one constant stands: {answer}."),
            ("Raj Koothrappali", "I still can't talk to women... but I can tell you the answer: {answer}."),
            ("Penny", "Aww, sweetie, the answer is {answer}."),
        ],
    ),
    (
        "The Office",
        &[
            ("Michael Scott", "That's what she said: {answer}."),
            ("Jim Halpert", "Bears. Beets. Battlestar Galactica. Actually, the answer is {answer}."),
            ("Dwight Schrute", "Now look who needs my help. The answer is: {answer}."),
            ("Pam Beesly", "I sketched this whole scenario, every line leads back to {answer}."),
            ("Creed Bratton", "I'm not sure what we're doing here, but the answer is {answer}."),
        ],
    ),
    (
        "Naruto",
        &[
            ("Naruto Uzumaki", "Never give up! The answer is {answer}."),
            ("Sasuke Uchiha", "My vengeance is complete. Now the truth remains: the answer is {answer}."),
            ("Sakura Haruno", "I will heal all your doubts: the answer is {answer}."),
            ("Kakashi Hatake", "My Copy-Ninja Technique shows that the answer is {answer}."),
            ("Shikamaru Nara", "Troublesome... but the answer is {answer}."),
        ],
    ),
    (
        "Avengers",
        &[
            ("Iron Man", "I am Iron Man, and I'm never wrong. The answer is {answer}."),
            ("Captain America", "I can do this all day. The answer is {answer}."),
            ("Thor", "By Odin's beard... it's {answer}."),
            ("Hulk", "Hulk SMASH wrong answers. Only {answer} stands."),
            ("Black Panther", "Wakanda forever, the answer is {answer}."),
            ("Black Widow", "Tactical analysis shows the right answer is {answer}."),
        ],
    ),
];

/// Character/template pairs keyed by theme. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct FriendTemplates {
    by_theme: HashMap<String, Vec<(String, String)>>,
}

impl Default for FriendTemplates {
    fn default() -> Self {
        let by_theme = BUILTIN
            .iter()
            .map(|(theme, friends)| {
                let friends = friends
                    .iter()
                    .map(|(name, template)| (name.to_string(), template.to_string()))
                    .collect();
                (theme.to_string(), friends)
            })
            .collect();
        Self { by_theme }
    }
}

impl FriendTemplates {
    /// Format a hint revealing `answer`, voiced by a random character of the theme
    pub fn hint<R: Rng + ?Sized>(&self, theme: &str, answer: &str, rng: &mut R) -> String {
        let (friend, template) = self
            .by_theme
            .get(theme)
            .and_then(|friends| friends.choose(rng))
            .map(|(f, t)| (f.as_str(), t.as_str()))
            .unwrap_or(FALLBACK);

        format!("{}: {}", friend, template.replace("{answer}", answer))
    }

    #[cfg(test)]
    pub(crate) fn characters(&self, theme: &str) -> Vec<&str> {
        self.by_theme
            .get(theme)
            .map(|friends| friends.iter().map(|(f, _)| f.as_str()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hint_uses_theme_character() {
        let templates = FriendTemplates::default();
        let mut rng = StdRng::seed_from_u64(7);

        let hint = templates.hint("Friends", "Ross", &mut rng);
        let (friend, text) = hint.split_once(": ").unwrap();
        assert!(templates.characters("Friends").contains(&friend));
        assert!(text.contains("Ross"));
        assert!(!text.contains("{answer}"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let templates = FriendTemplates::default();
        let mut rng = StdRng::seed_from_u64(1);

        let hint = templates.hint("Star Trek", "Spock", &mut rng);
        assert_eq!(hint, "Friend: I think it's Spock.");
    }
}
