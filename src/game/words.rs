//! Word pairs: the live generator boundary and the offline fallback deck
//!
//! A live generator (anything implementing [`WordPairProvider`]) is asked
//! once per game. Any failure, malformed output or a pair whose two words
//! are the same falls back to the curated table, which never repeats a pair
//! within a tier until every pair of that tier has been dealt.

use once_cell::sync::Lazy;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::process::Command;
use std::str::FromStr;
use thiserror::Error;

/// Pairs per tier in the curated fallback table
pub const FALLBACK_TIER_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    fn tier(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// The secret words for one game. Immutable once dealt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    pub civilian: String,
    pub undercover: String,
    pub relationship: String,
}

impl WordPair {
    pub fn new(civilian: &str, undercover: &str, relationship: &str) -> Self {
        Self {
            civilian: civilian.to_string(),
            undercover: undercover.to_string(),
            relationship: relationship.to_string(),
        }
    }

    /// Both words are the same word ignoring case and surrounding whitespace.
    pub fn is_degenerate(&self) -> bool {
        normalize(&self.civilian) == normalize(&self.undercover)
    }
}

/// Lowercased, trimmed form used for every word comparison.
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Where a dealt pair came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSource {
    Live,
    Fallback,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("word generator unavailable: {0}")]
    Unavailable(String),

    #[error("word generator failed: {0}")]
    Failed(String),

    #[error("malformed generator response: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A live word-pair generator.
pub trait WordPairProvider {
    fn generate(&self, difficulty: Difficulty) -> Result<WordPair, ProviderError>;
}

static FALLBACK_TABLE: Lazy<[Vec<WordPair>; 3]> = Lazy::new(|| {
    let tier = |rows: &[(&str, &str, &str)]| -> Vec<WordPair> {
        rows.iter().map(|(c, u, r)| WordPair::new(c, u, r)).collect()
    };
    [
        tier(&[
            ("Tea", "Coffee", "Both are popular hot beverages"),
            ("Pizza", "Burger", "Both are fast food items"),
            ("Apple", "Orange", "Both are common fruits"),
            ("Dog", "Cat", "Both are common pets"),
            ("Lion", "Tiger", "Both are big cats"),
            ("Chair", "Stool", "Both are seats"),
            ("Pen", "Pencil", "Both are writing tools"),
            ("Watch", "Clock", "Both tell time"),
            ("School", "College", "Both are educational institutions"),
            ("Beach", "Pool", "Both are places to swim"),
        ]),
        tier(&[
            ("Soap", "Detergent", "Both are used for cleaning but on different surfaces"),
            ("Pillow", "Cushion", "Both are soft and stuffed but used in different places"),
            ("Towel", "Napkin", "Both are used for drying or wiping"),
            ("Button", "Zipper", "Both fasten clothing"),
            ("Bollywood", "Hollywood", "Both are film industries"),
            ("Anime", "Cartoon", "Both are animated media"),
            ("Album", "Playlist", "Both are music collections"),
            ("Celebrity", "Influencer", "Both are famous people"),
            ("Remake", "Sequel", "Both are follow-up films"),
            ("Meme", "GIF", "Both are internet content"),
        ]),
        tier(&[
            ("Legend", "Myth", "Both are traditional stories with different historical claims"),
            ("Stalactite", "Stalagmite", "Both are cave formations growing in opposite directions"),
            ("Poetry", "Prose", "Both are written expression with different structures"),
            ("Proton", "Neutron", "Both are particles in the atomic nucleus"),
            ("Apathy", "Empathy", "Both describe emotional states regarding others"),
            ("Monarchy", "Dictatorship", "Both are forms of single-leader governance"),
            ("Barcode", "QR Code", "Both are scannable data formats"),
            ("Symmetry", "Pattern", "Both describe visual organization and repetition"),
            ("Satellite", "Astronaut", "Both orbit the earth"),
            ("Inflation", "Recession", "Both are economic states affecting money value"),
        ]),
    ]
});

/// The curated pairs of one tier.
pub fn fallback_pairs(difficulty: Difficulty) -> &'static [WordPair] {
    &FALLBACK_TABLE[difficulty.tier()]
}

/// Session-scoped view of the fallback table that tracks dealt pairs.
#[derive(Debug, Default)]
pub struct FallbackDeck {
    used: [HashSet<usize>; 3],
}

impl FallbackDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deal an unused pair of the tier, starting over once the tier is spent.
    pub fn draw<R: Rng + ?Sized>(&mut self, difficulty: Difficulty, rng: &mut R) -> WordPair {
        let pairs = fallback_pairs(difficulty);
        let used = &mut self.used[difficulty.tier()];
        if used.len() >= pairs.len() {
            tracing::debug!("fallback tier {} exhausted, reshuffling", difficulty);
            used.clear();
        }

        let unused: Vec<usize> = (0..pairs.len()).filter(|i| !used.contains(i)).collect();
        let index = unused[rng.random_range(0..unused.len())];
        used.insert(index);
        pairs[index].clone()
    }

    #[cfg(test)]
    pub fn used_count(&self, difficulty: Difficulty) -> usize {
        self.used[difficulty.tier()].len()
    }
}

/// One dealt pair plus what the caller should tell the players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDraw {
    pub pair: WordPair,
    pub source: PairSource,
    /// Set only the first time this session falls back to the offline table
    pub fallback_notice: bool,
}

/// Live generator with the offline deck behind it.
pub struct WordSource {
    live: Option<Box<dyn WordPairProvider>>,
    deck: FallbackDeck,
    fallback_announced: bool,
}

impl WordSource {
    pub fn new(live: Option<Box<dyn WordPairProvider>>) -> Self {
        Self {
            live,
            deck: FallbackDeck::new(),
            fallback_announced: false,
        }
    }

    /// Offline only, never asks a generator.
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Deal the pair for the next game. Never fails.
    pub fn draw<R: Rng + ?Sized>(&mut self, difficulty: Difficulty, rng: &mut R) -> WordDraw {
        if let Some(live) = &self.live {
            match live.generate(difficulty) {
                Ok(pair) if !pair.is_degenerate() => {
                    tracing::debug!("live word pair generated ({})", difficulty);
                    return WordDraw {
                        pair,
                        source: PairSource::Live,
                        fallback_notice: false,
                    };
                }
                Ok(pair) => {
                    tracing::warn!(
                        "discarding generated pair with identical words: {:?}",
                        pair.civilian
                    );
                }
                Err(e) => {
                    tracing::warn!("word generator failed, using fallback table: {}", e);
                }
            }
        }

        let pair = self.deck.draw(difficulty, rng);
        // Offline-only sessions never had a live generator to fall back from
        let fallback_notice = self.live.is_some() && !self.fallback_announced;
        if fallback_notice {
            self.fallback_announced = true;
        }
        WordDraw {
            pair,
            source: PairSource::Fallback,
            fallback_notice,
        }
    }

    #[cfg(test)]
    pub fn deck(&self) -> &FallbackDeck {
        &self.deck
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedPair {
    civilian_word: Option<String>,
    undercover_word: Option<String>,
    relationship: Option<String>,
}

/// Parse the text a generator printed into a pair.
///
/// Tolerates markdown code fences, stray HTML tags and prose around the
/// JSON object. All three fields must be present and non-blank.
pub fn parse_generated_pair(raw: &str) -> Result<WordPair, ProviderError> {
    let cleaned = strip_tags(&raw.replace("```json", "").replace("```", ""));
    let cleaned = cleaned.trim();

    let parsed: GeneratedPair = match serde_json::from_str(cleaned) {
        Ok(p) => p,
        Err(first) => {
            let start = cleaned.find('{');
            let end = cleaned.rfind('}');
            match (start, end) {
                (Some(s), Some(e)) if s < e => serde_json::from_str(&cleaned[s..=e])
                    .map_err(|e| ProviderError::Malformed(e.to_string()))?,
                _ => return Err(ProviderError::Malformed(first.to_string())),
            }
        }
    };

    let field = |value: Option<String>, name: &str| -> Result<String, ProviderError> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ProviderError::Malformed(format!("missing {}", name)))
    };

    Ok(WordPair {
        civilian: field(parsed.civilian_word, "civilian_word")?,
        undercover: field(parsed.undercover_word, "undercover_word")?,
        relationship: field(parsed.relationship, "relationship")?,
    })
}

/// Remove anything that looks like an HTML tag.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Runs an external generator command with the difficulty as its last
/// argument and reads one JSON pair from its stdout.
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
}

impl CommandProvider {
    /// Build from a whitespace-separated command line.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl WordPairProvider for CommandProvider {
    fn generate(&self, difficulty: Difficulty) -> Result<WordPair, ProviderError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(difficulty.as_str())
            .output()
            .map_err(|e| ProviderError::Unavailable(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_generated_pair(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FixedProvider(Result<WordPair, String>);

    impl WordPairProvider for FixedProvider {
        fn generate(&self, _difficulty: Difficulty) -> Result<WordPair, ProviderError> {
            self.0.clone().map_err(ProviderError::Failed)
        }
    }

    struct CountingProvider {
        calls: Rc<Cell<u32>>,
    }

    impl WordPairProvider for CountingProvider {
        fn generate(&self, _difficulty: Difficulty) -> Result<WordPair, ProviderError> {
            self.calls.set(self.calls.get() + 1);
            Err(ProviderError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_fallback_tiers_have_ten_distinct_pairs() {
        for difficulty in Difficulty::all() {
            let pairs = fallback_pairs(*difficulty);
            assert_eq!(pairs.len(), FALLBACK_TIER_SIZE);
            for pair in pairs {
                assert!(!pair.is_degenerate(), "{:?}", pair);
                assert!(!pair.relationship.is_empty());
            }
        }
    }

    #[test]
    fn test_deck_does_not_repeat_until_exhausted() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut deck = FallbackDeck::new();
        let mut seen = HashSet::new();
        for _ in 0..FALLBACK_TIER_SIZE {
            let pair = deck.draw(Difficulty::Easy, &mut rng);
            assert!(seen.insert(pair.civilian.clone()), "repeated {}", pair.civilian);
        }
        assert_eq!(deck.used_count(Difficulty::Easy), FALLBACK_TIER_SIZE);
        assert_eq!(deck.used_count(Difficulty::Hard), 0);
    }

    #[test]
    fn test_eleventh_draw_reshuffles() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut deck = FallbackDeck::new();
        for _ in 0..FALLBACK_TIER_SIZE {
            deck.draw(Difficulty::Hard, &mut rng);
        }
        let pair = deck.draw(Difficulty::Hard, &mut rng);
        assert!(!pair.civilian.is_empty());
        assert!(!pair.undercover.is_empty());
        assert!(fallback_pairs(Difficulty::Hard).contains(&pair));
        assert_eq!(deck.used_count(Difficulty::Hard), 1);
    }

    #[test]
    fn test_live_pair_is_used() {
        let mut rng = StdRng::seed_from_u64(1);
        let pair = WordPair::new("Sun", "Moon", "Both are in the sky");
        let mut source = WordSource::new(Some(Box::new(FixedProvider(Ok(pair.clone())))));
        let draw = source.draw(Difficulty::Medium, &mut rng);
        assert_eq!(draw.pair, pair);
        assert_eq!(draw.source, PairSource::Live);
        assert!(!draw.fallback_notice);
    }

    #[test]
    fn test_failure_falls_back_with_one_notice() {
        let mut rng = StdRng::seed_from_u64(2);
        let provider = FixedProvider(Err("quota exceeded".to_string()));
        let mut source = WordSource::new(Some(Box::new(provider)));

        let first = source.draw(Difficulty::Easy, &mut rng);
        assert_eq!(first.source, PairSource::Fallback);
        assert!(first.fallback_notice);

        let second = source.draw(Difficulty::Easy, &mut rng);
        assert_eq!(second.source, PairSource::Fallback);
        assert!(!second.fallback_notice);
    }

    #[test]
    fn test_degenerate_live_pair_is_discarded() {
        let mut rng = StdRng::seed_from_u64(3);
        let same = WordPair::new("Tea", " tea ", "Identical");
        let mut source = WordSource::new(Some(Box::new(FixedProvider(Ok(same)))));
        let draw = source.draw(Difficulty::Easy, &mut rng);
        assert_eq!(draw.source, PairSource::Fallback);
        assert!(!draw.pair.is_degenerate());
    }

    #[test]
    fn test_provider_asked_once_per_draw() {
        let mut rng = StdRng::seed_from_u64(4);
        let calls = Rc::new(Cell::new(0));
        let provider = CountingProvider {
            calls: Rc::clone(&calls),
        };
        let mut source = WordSource::new(Some(Box::new(provider)));
        source.draw(Difficulty::Easy, &mut rng);
        source.draw(Difficulty::Easy, &mut rng);
        assert_eq!(calls.get(), 2);
        assert_eq!(source.deck().used_count(Difficulty::Easy), 2);
    }

    #[test]
    fn test_offline_source_never_announces() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut source = WordSource::offline();
        let draw = source.draw(Difficulty::Medium, &mut rng);
        assert_eq!(draw.source, PairSource::Fallback);
        assert!(!draw.fallback_notice);
    }

    #[test]
    fn test_parse_plain_json() {
        let pair = parse_generated_pair(
            r#"{"civilian_word": " Kite ", "undercover_word": "Balloon", "relationship": "Both fly"}"#,
        )
        .unwrap();
        assert_eq!(pair, WordPair::new("Kite", "Balloon", "Both fly"));
    }

    #[test]
    fn test_parse_fenced_and_wrapped_json() {
        let raw = "Here you go:\n```json\n<p>{\"civilian_word\":\"Train\",\"undercover_word\":\"Bus\",\"relationship\":\"Both carry passengers\"}</p>\n```";
        let pair = parse_generated_pair(raw).unwrap();
        assert_eq!(pair.civilian, "Train");
        assert_eq!(pair.undercover, "Bus");
    }

    #[test]
    fn test_parse_rejects_blank_field() {
        let raw = r#"{"civilian_word": "Train", "undercover_word": "  ", "relationship": "x"}"#;
        assert!(matches!(
            parse_generated_pair(raw),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_generated_pair("no json here").is_err());
    }

    #[test]
    fn test_command_line_parsing() {
        assert!(CommandProvider::from_command_line("   ").is_none());
        let provider = CommandProvider::from_command_line("python3 gen.py --fast").unwrap();
        assert_eq!(provider.program, "python3");
        assert_eq!(provider.args, vec!["gen.py", "--fast"]);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.previous(), Difficulty::Hard);
    }
}
